//! HTML parsers for listing and profile pages.
//!
//! All parsers are pure: HTML in, records out, no I/O.

pub mod address;
pub mod dom;
pub mod listing;
pub mod profile;

pub use address::{Address, parse_address};
pub use listing::parse_listing_page;
pub use profile::parse_profile;

use crate::models::AttorneyRecord;

/// Turns one fetched listing page into candidate records.
///
/// Each record's `uuid` is its identifier for dedup and merge. Any
/// `Fn(&str) -> Vec<AttorneyRecord>` is a parser, so
/// `Arc::new(parse_listing_page)` works directly.
pub trait RecordParser: Send + Sync {
    fn parse(&self, html: &str) -> Vec<AttorneyRecord>;
}

impl<F> RecordParser for F
where
    F: Fn(&str) -> Vec<AttorneyRecord> + Send + Sync,
{
    fn parse(&self, html: &str) -> Vec<AttorneyRecord> {
        self(html)
    }
}
