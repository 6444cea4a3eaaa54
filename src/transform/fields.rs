//! Field normalization for the cleaning stage

use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\d.,]+").expect("price token pattern is valid"));

static DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+").expect("digit run pattern is valid"));

/// Extracts the leading numeric token from a price string
///
/// `"£51.77"` becomes `51.77`; thousands separators are stripped. Empty
/// input or input without a numeric token yields `None`.
pub fn parse_price(price_text: &str) -> Option<f64> {
    if price_text.is_empty() {
        return None;
    }
    let token = PRICE_TOKEN.find(price_text)?;
    token.as_str().replace(',', "").parse().ok()
}

/// Extracts the available count from availability text
///
/// `"In stock (22 available)"` becomes `22`. Empty input and input without
/// any digit run both count as zero.
pub fn parse_availability(availability_text: &str) -> u32 {
    DIGIT_RUN
        .find(availability_text)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Maps a rating word token to its numeric value
///
/// "Zero" through "Five" map to 0..=5; the empty token and unrecognized
/// words are absent rather than zero.
pub fn rating_from_word(rating_text: &str) -> Option<u8> {
    match rating_text {
        "Zero" => Some(0),
        "One" => Some(1),
        "Two" => Some(2),
        "Three" => Some(3),
        "Four" => Some(4),
        "Five" => Some(5),
        _ => None,
    }
}
