//! On-disk JSON documents exchanged between phases.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Output of discovery, input of the listing crawl.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PracticeAreaIndex {
    pub state_slug: String,
    pub city_slug: String,
    pub practice_areas: Vec<String>,
}

/// Single-worker progress manifest kept beside `listings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressManifest {
    /// Sorted unit identifiers whose pagination is exhausted.
    #[serde(rename = "completed_pas", alias = "completed_unit_ids")]
    pub completed_units: Vec<String>,
    #[serde(rename = "total_pas", alias = "total_units")]
    pub total_units: usize,
    pub started_at: String,
}

impl ProgressManifest {
    #[must_use]
    pub fn new(total_units: usize, started_at: impl Into<String>) -> Self {
        Self {
            completed_units: Vec::new(),
            total_units,
            started_at: started_at.into(),
        }
    }

    /// Record a unit as done, keeping the list sorted and unique.
    pub fn mark_completed(&mut self, unit: &str) {
        if let Err(pos) = self.completed_units.binary_search_by(|u| u.as_str().cmp(unit)) {
            self.completed_units.insert(pos, unit.to_string());
        }
    }

    #[must_use]
    pub fn is_completed(&self, unit: &str) -> bool {
        self.completed_units
            .binary_search_by(|u| u.as_str().cmp(unit))
            .is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchStatus {
    Success,
    Failed,
    Skipped,
}

impl std::fmt::Display for FetchStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Skipped => "skipped",
        })
    }
}

/// `fetch_status.json`: profile identifier to final status.
pub type FetchStatusMap = BTreeMap<String, FetchStatus>;
