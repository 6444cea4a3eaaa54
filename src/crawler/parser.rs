//! HTML parsers for listing and detail pages
//!
//! Both extraction functions are pure and tolerant: missing markup yields
//! absent or empty fields, never an error. Every link and image URL is
//! joined against the page's redirect-final URL, not a hardcoded site root.

use crate::record::{DetailRecord, ListingRecord};
use scraper::{ElementRef, Html, Selector};
use std::collections::BTreeMap;
use url::Url;

/// Extracts one summary record per item entry on a listing page
///
/// Item entries are `article.product_pod` elements, in document order.
/// Within an entry: title and detail link come from the `h3 a` anchor,
/// price/availability come from sibling paragraph text, the rating is the
/// non-generic class token of the star-rating marker (a word like "Three"),
/// and the image URL is the thumbnail's joined `src`.
///
/// # Arguments
///
/// * `html` - The listing page content
/// * `base_url` - The page's redirect-final URL, used for all joins
///
/// # Example
///
/// ```
/// use bookharvest::crawler::parse_listing;
/// use url::Url;
///
/// let html = r#"<article class="product_pod">
///     <h3><a href="item.html" title="Some Book">Some...</a></h3>
///     <p class="price_color">£10.00</p>
/// </article>"#;
/// let base = Url::parse("http://example.com/catalogue/page-1.html").unwrap();
/// let items = parse_listing(html, &base);
/// assert_eq!(items[0].title, "Some Book");
/// assert_eq!(items[0].product_page_url, "http://example.com/catalogue/item.html");
/// ```
pub fn parse_listing(html: &str, base_url: &Url) -> Vec<ListingRecord> {
    let document = Html::parse_document(html);
    let mut items = Vec::new();

    if let Ok(pod_selector) = Selector::parse("article.product_pod") {
        for pod in document.select(&pod_selector) {
            items.push(parse_item_entry(&pod, base_url));
        }
    }

    items
}

/// Extracts the summary fields of a single item entry
fn parse_item_entry(pod: &ElementRef, base_url: &Url) -> ListingRecord {
    let mut record = ListingRecord::default();

    if let Ok(anchor_selector) = Selector::parse("h3 a") {
        if let Some(anchor) = pod.select(&anchor_selector).next() {
            record.title = anchor
                .value()
                .attr("title")
                .unwrap_or_default()
                .trim()
                .to_string();
            if let Some(href) = anchor.value().attr("href") {
                record.product_page_url = join_url(base_url, href);
            }
        }
    }

    record.price_text = first_text(pod, "p.price_color");
    record.availability_text = first_text(pod, "p.instock.availability");
    record.rating_text = rating_token(pod);

    if let Ok(img_selector) = Selector::parse("img") {
        if let Some(img) = pod.select(&img_selector).next() {
            if let Some(src) = img.value().attr("src") {
                record.image_url = join_url(base_url, src);
            }
        }
    }

    record
}

/// Extracts the enrichment record from a detail page
///
/// - category: text of the 3rd breadcrumb anchor, absent when the trail is
///   shorter (the first two entries are navigation, not classification)
/// - description: text of the first paragraph following the description
///   anchor element, empty when the page has none
/// - attributes: every attribute-table row's header-cell text mapped to its
///   data-cell text; rows missing either cell are skipped
///
/// # Arguments
///
/// * `html` - The detail page content
/// * `final_url` - The redirect-final URL the content was fetched from
pub fn parse_detail(html: &str, final_url: &Url) -> DetailRecord {
    let document = Html::parse_document(html);

    DetailRecord {
        category: breadcrumb_category(&document),
        description: description_text(&document),
        attributes: attribute_table(&document),
        fetched_url: final_url.to_string(),
    }
}

fn breadcrumb_category(document: &Html) -> Option<String> {
    let selector = Selector::parse("ul.breadcrumb li a").ok()?;
    let crumbs: Vec<ElementRef> = document.select(&selector).collect();
    crumbs.get(2).map(|crumb| element_text(crumb))
}

fn description_text(document: &Html) -> String {
    if let Ok(selector) = Selector::parse("#product_description") {
        if let Some(heading) = document.select(&selector).next() {
            let mut following = heading.next_siblings().filter_map(ElementRef::wrap);
            if let Some(paragraph) = following.find(|el| el.value().name() == "p") {
                return element_text(&paragraph);
            }
        }
    }
    String::new()
}

fn attribute_table(document: &Html) -> BTreeMap<String, String> {
    let mut attributes = BTreeMap::new();

    if let (Ok(row_selector), Ok(th_selector), Ok(td_selector)) = (
        Selector::parse("table.table-striped tr"),
        Selector::parse("th"),
        Selector::parse("td"),
    ) {
        for row in document.select(&row_selector) {
            let header = row.select(&th_selector).next();
            let value = row.select(&td_selector).next();
            if let (Some(header), Some(value)) = (header, value) {
                attributes.insert(element_text(&header), element_text(&value));
            }
        }
    }

    attributes
}

/// Trimmed text of the first element matching `selector`, or empty
fn first_text(scope: &ElementRef, selector: &str) -> String {
    if let Ok(selector) = Selector::parse(selector) {
        if let Some(element) = scope.select(&selector).next() {
            return element_text(&element);
        }
    }
    String::new()
}

/// The non-generic class token of the star-rating marker, e.g. "Three"
fn rating_token(pod: &ElementRef) -> String {
    if let Ok(selector) = Selector::parse("p.star-rating") {
        if let Some(element) = pod.select(&selector).next() {
            if let Some(word) = element.value().classes().find(|c| *c != "star-rating") {
                return word.to_string();
            }
        }
    }
    String::new()
}

fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Joins a possibly-relative href against the page base; a join failure
/// falls back to the raw href rather than dropping the field
fn join_url(base: &Url, href: &str) -> String {
    match base.join(href) {
        Ok(joined) => joined.to_string(),
        Err(_) => href.to_string(),
    }
}
