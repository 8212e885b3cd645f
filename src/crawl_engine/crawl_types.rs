//! Core types for crawl operations.
//!
//! Error taxonomy, work units and the per-unit / per-run result types.

use std::fmt;
use std::path::PathBuf;

use crate::models::RecordSet;

/// Failures that abort a phase or a unit
#[derive(Debug, thiserror::Error)]
pub enum CrawlError {
    /// Fatal: raised before any crawling begins
    #[error("cannot read input artifact {}: {reason}", path.display())]
    InputArtifact { path: PathBuf, reason: String },

    /// Fatal: raised before any crawling begins
    #[error("cannot create output directory {}: {reason}", path.display())]
    OutputDir { path: PathBuf, reason: String },

    /// Caught at the orchestrator's task boundary; never escapes a run
    #[error("unit '{unit}' failed: {reason}")]
    Unit { unit: String, reason: String },

    #[error("browser error: {0}")]
    Browser(String),

    #[error("crawl operation was cancelled")]
    Cancelled,
}

impl CrawlError {
    pub(crate) fn unit(unit: &str, err: &anyhow::Error) -> Self {
        // {:#} keeps the whole context chain
        Self::Unit {
            unit: unit.to_string(),
            reason: format!("{err:#}"),
        }
    }
}

/// Convenience alias for Result with `CrawlError`
pub type CrawlResult<T> = Result<T, CrawlError>;

/// One practice area to paginate
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkUnit {
    pub id: String,
    /// 1-based position in the full input list
    pub position: usize,
}

impl WorkUnit {
    #[must_use]
    pub fn new(id: impl Into<String>, position: usize) -> Self {
        Self {
            id: id.into(),
            position,
        }
    }
}

/// Why a unit's pagination ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Fetch gave nothing back (absent or retries exhausted)
    FetchFailed,
    /// Page parsed to zero cards
    NoCards,
    /// Every card on the page was already collected for this unit
    NoNewRecords,
    CapReached,
    MaxPages,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::FetchFailed => "fetch failed",
            Self::NoCards => "no cards",
            Self::NoNewRecords => "no new records",
            Self::CapReached => "result cap reached",
            Self::MaxPages => "page limit reached",
        })
    }
}

/// Result of one exhausted unit
#[derive(Debug, Clone)]
pub struct UnitOutcome {
    pub unit: String,
    pub records: RecordSet,
    pub pages_fetched: u32,
    pub stop: StopReason,
}

/// End-of-run summary of a listing crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlSummary {
    pub total_units: usize,
    pub skipped_units: usize,
    pub completed_units: usize,
    pub failed_units: Vec<String>,
    pub records: usize,
    pub output_path: PathBuf,
    /// Nothing was fetched because a finished artifact already existed
    pub already_complete: bool,
}

impl CrawlSummary {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed_units.is_empty()
    }
}
