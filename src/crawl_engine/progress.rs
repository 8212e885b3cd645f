//! Progress reporting abstraction for crawl operations
//!
//! Defines the `ProgressReporter` trait for lifecycle event reporting
//! and provides a no-op implementation for runs without a display.

use crate::models::FetchStatus;

/// Trait for reporting crawl progress at key lifecycle events
///
/// Implementations can drive progress bars, send updates to channels, etc.
/// Called from concurrent worker tasks, so implementations must be `Sync`.
pub trait ProgressReporter: Send + Sync {
    /// A listing crawl over `total` units starts; `skipped` are already done
    fn report_crawl_planned(&self, total: usize, skipped: usize);

    /// A worker picked up `unit` (`index` is 1-based within `total`)
    fn report_unit_started(&self, unit: &str, index: usize, total: usize);

    /// One listing page was fetched and parsed
    fn report_page_fetched(&self, unit: &str, page: u32, new_count: usize, total_unique: usize);

    /// `unit` finished and its checkpoint is on disk
    fn report_unit_completed(&self, unit: &str, records: usize);

    /// A bulk fetch of `total` profiles starts
    fn report_fetch_planned(&self, total: usize);

    /// A profile fetch reached its final status
    fn report_fetch_completed(&self, id: &str, status: FetchStatus);
}

/// Progress reporter that does nothing
///
/// All methods are no-ops and will be inlined away by the compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpProgress;

impl ProgressReporter for NoOpProgress {
    #[inline(always)]
    fn report_crawl_planned(&self, _total: usize, _skipped: usize) {}

    #[inline(always)]
    fn report_unit_started(&self, _unit: &str, _index: usize, _total: usize) {}

    #[inline(always)]
    fn report_page_fetched(&self, _unit: &str, _page: u32, _new_count: usize, _total_unique: usize) {
    }

    #[inline(always)]
    fn report_unit_completed(&self, _unit: &str, _records: usize) {}

    #[inline(always)]
    fn report_fetch_planned(&self, _total: usize) {}

    #[inline(always)]
    fn report_fetch_completed(&self, _id: &str, _status: FetchStatus) {}
}
