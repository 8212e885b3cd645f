//! Core configuration types for the scraper
//!
//! This module contains the `ScrapeConfig` struct: every tunable of the fetch
//! and crawl engine, injected once at construction instead of being read from
//! ambient state.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration struct for scraping operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeConfig {
    /// Per-location data directory (`data/{city}_{st}/`).
    ///
    /// Every artifact of every phase lives here: the input index, unit
    /// checkpoints, `listings.json`, `html/`, `records.json`, `logs/`.
    pub(crate) data_dir: PathBuf,
    pub(crate) base_url: String,
    pub(crate) profile_base_url: String,

    /// Uniform random delay window slept before every physical fetch attempt
    pub(crate) delay_min_secs: f64,
    pub(crate) delay_max_secs: f64,

    /// Fetch slots per gate. Independent of `workers`: many workers still
    /// share this many in-flight requests.
    pub(crate) fetch_concurrency: usize,

    /// Units (practice areas) crawled concurrently
    pub(crate) workers: usize,

    pub(crate) max_attempts: u32,
    pub(crate) backoff_base_secs: f64,

    /// Timeout in seconds for one physical fetch attempt
    ///
    /// Exceeding it counts as a transient failure and goes through the retry
    /// ladder like any other.
    ///
    /// Default: 30 seconds
    pub(crate) request_timeout_secs: u64,

    /// Pagination safety valve per unit
    pub(crate) max_pages: u32,

    /// Global result cap across all units of one crawl run
    pub(crate) max_results: Option<usize>,

    /// Try plain HTTP before the browser pool
    pub(crate) fast_path_enabled: bool,

    /// Concurrency and delay window of the bulk fast-path sweep
    pub(crate) sweep_concurrency: usize,
    pub(crate) sweep_delay_min_secs: f64,
    pub(crate) sweep_delay_max_secs: f64,

    /// Browser instances in the slow-path pool; slow-path batch width
    pub(crate) browsers: usize,

    /// Seconds a rendered page is given before its HTML is read
    pub(crate) page_settle_secs: f64,

    pub(crate) headless: bool,
    pub(crate) proxy_url: Option<String>,
    pub(crate) user_agent: String,
}
