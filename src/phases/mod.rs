//! The five pipeline phases and the `run` chain.
//!
//! Each phase reads the previous phase's artifact from disk and writes its
//! own atomically, so any phase can be rerun on its own.

pub mod crawl_listings;
pub mod discover;
pub mod export;
pub mod fetch_profiles;
pub mod parse_profiles;
pub mod pipeline;

pub use crawl_listings::{
    CrawlListingsOptions, crawl_listings, crawl_listings_with, load_practice_areas, select_units,
};
pub use discover::{
    Location, STATES, discover, discover_practice_areas, discover_with, extract_practice_areas,
    parse_location,
};
pub use export::{clean_phone, clean_record, export, export_file_name, write_csv};
pub use fetch_profiles::{
    FetchProfilesOptions, FetchProfilesReport, bulk_fetcher, fetch_profiles, fetch_profiles_with,
    load_listings,
};
pub use parse_profiles::{ParseReport, merge_profile, parse_profiles};
pub use pipeline::run_pipeline;
