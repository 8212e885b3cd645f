//! Crawl Engine Module
//!
//! The resumable listing crawl (per-unit pagination, worker pool, merge)
//! and the two-phase bulk fetch used for profile pages.

// Sub-modules
pub mod bulk;
pub mod crawl_types;
pub mod merge;
pub mod orchestrator;
pub mod page_timeout;
pub mod progress;
pub mod resume;
pub mod state;
pub mod unit_crawler;

// Re-export orchestration and progress types
pub use orchestrator::{CrawlJob, CrawlOrchestrator};
pub use progress::{NoOpProgress, ProgressReporter};

// Re-export the building blocks for callers that drive units themselves
pub use bulk::{BulkFetchReport, BulkFetcher, ProfileJob};
pub use merge::{MergeReport, merge_checkpoints};
pub use resume::{PendingWork, ResumeController, ResumePlan};
pub use state::{GlobalCrawlState, Registration};
pub use unit_crawler::{CrawlContext, ListingSource, crawl_unit};

// Re-export crawl types
pub use crawl_types::{CrawlError, CrawlResult, CrawlSummary, StopReason, UnitOutcome, WorkUnit};
pub use page_timeout::with_page_timeout;
