//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the scraper, including:
//! - Building an HTTP client with a proper user agent string
//! - GET requests with retry and exponential backoff
//! - Returning the redirect-final URL alongside the body
//! - Error reporting after the retry budget is exhausted

use crate::config::Config;
use crate::FetchError;
use rand::{rng, Rng};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// A successfully fetched page
#[derive(Debug, Clone)]
pub struct FetchedPage {
    /// Page body content
    pub body: String,

    /// Final URL after redirects. This is the mandatory base for resolving
    /// any relative link found in `body`; the originally requested URL may
    /// differ and must not be used for joins.
    pub final_url: Url,
}

/// Retry schedule for a fetch: attempt budget and backoff shape.
///
/// The delay computation is exposed separately from the sleeping so the
/// schedule can be verified in tests without waiting on it.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Attempts per request, counted from 1
    pub max_retries: u32,

    /// Delay before the second attempt; doubled for each attempt after that
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_retries: config.fetch.max_retries.max(1),
            base_delay: Duration::from_millis(config.fetch.backoff_base_ms),
        }
    }

    /// Delay applied after failed attempt number `attempt` (1-indexed):
    /// `base_delay * 2^(attempt-1) * (1 + jitter)` with jitter in [0, 1).
    ///
    /// The doubling exponent is capped so pathological attempt counts cannot
    /// overflow the multiplier.
    pub fn delay_for(&self, attempt: u32, jitter: f64) -> Duration {
        let doublings = attempt.saturating_sub(1).min(16);
        let factor = (1u64 << doublings) as f64;
        self.base_delay.mul_f64(factor * (1.0 + jitter))
    }
}

/// Builds the HTTP client used for every request in a run
///
/// Redirects are followed by reqwest's default policy; the final URL is
/// reported back through [`FetchedPage::final_url`].
///
/// # Arguments
///
/// * `config` - The scraper configuration
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
///
/// # Example
///
/// ```no_run
/// use bookharvest::config::Config;
/// use bookharvest::crawler::build_http_client;
///
/// let client = build_http_client(&Config::default()).unwrap();
/// ```
pub fn build_http_client(config: &Config) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL; ContactEmail)
    let user_agent = format!(
        "{}/{} (+{}; {})",
        config.user_agent.crawler_name,
        config.user_agent.crawler_version,
        config.user_agent.contact_url,
        config.user_agent.contact_email
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(Duration::from_secs(config.fetch.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches a URL with retry and exponential backoff
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | HTTP 200 | Return body + final URL |
/// | Any non-200 status | Retry after backoff |
/// | Network error / timeout | Retry after backoff |
/// | Body read error | Retry after backoff |
/// | Budget exhausted | Return `FetchError::RetriesExhausted` |
///
/// Non-200 statuses are deliberately not immediately fatal: some sites
/// answer 403 or 5xx transiently and recover on a later attempt.
///
/// The backoff between attempts is `policy.delay_for(attempt, jitter)` with
/// uniform jitter in [0, 1); no delay is applied after the final attempt.
/// On exhaustion a diagnostic with a manual-reproduction hint is logged and
/// the failure is returned as a value.
///
/// # Arguments
///
/// * `client` - The HTTP client to use
/// * `url` - The URL to fetch
/// * `policy` - Retry budget and backoff shape
pub async fn fetch_page(
    client: &Client,
    url: &str,
    policy: &RetryPolicy,
) -> Result<FetchedPage, FetchError> {
    let mut last_error = String::from("no attempts made");

    for attempt in 1..=policy.max_retries {
        match client.get(url).send().await {
            Ok(response) => {
                let status = response.status();
                if status == StatusCode::OK {
                    let final_url = response.url().clone();
                    match response.text().await {
                        Ok(body) => return Ok(FetchedPage { body, final_url }),
                        Err(e) => {
                            last_error = format!("body read failed: {}", e);
                            tracing::warn!(
                                "Failed to read body from {} (attempt {}/{}): {}",
                                url,
                                attempt,
                                policy.max_retries,
                                e
                            );
                        }
                    }
                } else {
                    last_error = format!("HTTP {}", status.as_u16());
                    tracing::warn!(
                        "Non-200 status {} for {} (attempt {}/{})",
                        status.as_u16(),
                        url,
                        attempt,
                        policy.max_retries
                    );
                }
            }
            Err(e) => {
                last_error = e.to_string();
                tracing::warn!(
                    "Request exception for {}: {} (attempt {}/{})",
                    url,
                    e,
                    attempt,
                    policy.max_retries
                );
            }
        }

        if attempt < policy.max_retries {
            let jitter = rng().random_range(0.0..1.0);
            tokio::time::sleep(policy.delay_for(attempt, jitter)).await;
        }
    }

    tracing::error!(
        "Failed to fetch {} after {} attempts. Try: curl -I {}",
        url,
        policy.max_retries,
        url
    );

    Err(FetchError::RetriesExhausted {
        url: url.to_string(),
        attempts: policy.max_retries,
        last_error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> RetryPolicy {
        RetryPolicy {
            max_retries: 4,
            base_delay: Duration::from_millis(1000),
        }
    }

    #[test]
    fn test_build_http_client() {
        let client = build_http_client(&Config::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_delay_doubles_per_attempt() {
        let policy = policy();
        assert_eq!(policy.delay_for(1, 0.0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(2, 0.0), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(3, 0.0), Duration::from_millis(4000));
        assert_eq!(policy.delay_for(4, 0.0), Duration::from_millis(8000));
    }

    #[test]
    fn test_delay_is_monotonically_non_decreasing_without_jitter() {
        let policy = policy();
        let mut previous = Duration::ZERO;
        for attempt in 1..=10 {
            let delay = policy.delay_for(attempt, 0.0);
            assert!(delay >= previous, "attempt {} shrank the delay", attempt);
            previous = delay;
        }
    }

    #[test]
    fn test_jitter_scales_delay_up_to_double() {
        let policy = policy();
        let base = policy.delay_for(1, 0.0);
        let jittered = policy.delay_for(1, 0.5);
        assert_eq!(jittered, base.mul_f64(1.5));

        // Full jitter never quite doubles: jitter is sampled from [0, 1).
        assert!(policy.delay_for(1, 0.999) < base * 2);
    }

    #[test]
    fn test_delay_exponent_is_capped() {
        let policy = policy();
        // Far beyond any real budget; must not overflow.
        let delay = policy.delay_for(1000, 0.0);
        assert_eq!(delay, policy.delay_for(17, 0.0));
    }
}
