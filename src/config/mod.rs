//! Configuration module for scraping runs
//!
//! This module provides the `ScrapeConfig` struct and its type-safe builder
//! for configuring fetch and crawl operations with validation and sensible defaults.

// Sub-modules
pub mod builder;
pub mod getters;
pub mod methods;
pub mod types;

// Re-exports for public API
pub use builder::{ScrapeConfigBuilder, WithDataDir};
pub use methods::{
    FETCH_STATUS_FILE, HTML_DIR, LISTINGS_FILE, LOGS_DIR, PRACTICE_AREAS_FILE,
    PROGRESS_MANIFEST_FILE, RECORDS_FILE,
};
pub use types::ScrapeConfig;
