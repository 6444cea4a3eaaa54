//! Record types for the scraped dataset

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Summary fields extracted from one item entry on a listing page.
///
/// Missing markup yields empty strings, never errors. URLs are absolute,
/// resolved against the listing page's redirect-final URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListingRecord {
    pub title: String,
    pub product_page_url: String,
    pub price_text: String,
    pub availability_text: String,
    pub rating_text: String,
    pub image_url: String,
}

/// Enrichment fields extracted from an item's detail page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetailRecord {
    /// Third breadcrumb entry, when the trail is long enough
    pub category: Option<String>,

    /// Free-text description; empty when the page has none
    pub description: String,

    /// Open attribute-table mapping; cardinality varies by item
    pub attributes: BTreeMap<String, String>,

    /// Redirect-final URL the detail content was actually fetched from
    pub fetched_url: String,
}

/// The merged record appended to the accumulator: one listing entry plus its
/// (possibly absent) detail enrichment. Identified by `product_page_url` for
/// downstream deduplication.
///
/// Serializes to a flat mapping: the recognized fields below with the open
/// attribute keys inlined at the top level. Both the raw dataset contract and
/// the union-of-keys CSV export rely on that flat form.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BookRecord {
    pub title: String,
    pub product_page_url: String,
    pub price_text: String,
    pub availability_text: String,
    pub rating_text: String,
    pub image_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fetched_url: Option<String>,

    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

impl BookRecord {
    /// Merges a listing record with its optional detail enrichment.
    ///
    /// A failed detail fetch or parse still yields a record carrying the
    /// listing fields; the detail-side fields simply stay absent.
    pub fn merge(listing: ListingRecord, detail: Option<DetailRecord>) -> Self {
        let mut record = Self {
            title: listing.title,
            product_page_url: listing.product_page_url,
            price_text: listing.price_text,
            availability_text: listing.availability_text,
            rating_text: listing.rating_text,
            image_url: listing.image_url,
            ..Self::default()
        };

        if let Some(detail) = detail {
            record.category = detail.category;
            record.description = Some(detail.description);
            record.fetched_url = Some(detail.fetched_url);
            record.attributes = detail.attributes;
        }

        record
    }
}
