//! Attorney directory scraper.
//!
//! Five phases, each reading the previous phase's artifact: `discover`
//! resolves a location to practice areas, `crawl-listings` paginates every
//! practice area into `listings.json` with per-unit checkpoints and resume,
//! `fetch-profiles` saves profile HTML through an HTTP sweep with browser
//! fallback, `parse-profiles` turns the HTML into `records.json`, and
//! `export` writes a cleaned CSV.

pub mod browser_pool;
pub mod browser_profile;
pub mod browser_setup;
pub mod cli;
pub mod config;
pub mod crawl_engine;
pub mod fetch;
pub mod models;
pub mod parsers;
pub mod phases;
pub mod store;
pub mod utils;

pub use config::ScrapeConfig;
pub use crawl_engine::{
    CrawlError, CrawlJob, CrawlOrchestrator, CrawlResult, CrawlSummary, NoOpProgress,
    ProgressReporter, ResumeController, ResumePlan,
};
pub use fetch::{EscalatingFetcher, FetchGate, FetchStack, PageFetcher};
pub use models::{AttorneyRecord, RecordSet};
pub use phases::run_pipeline;
