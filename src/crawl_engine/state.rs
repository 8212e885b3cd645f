//! State shared by every worker of one orchestrator run.
//!
//! Workers run on a multi-threaded runtime, so the check-then-mutate of
//! "insert ids, count, compare with the cap" happens under one mutex and
//! never spans an await. The cap flag is read lock-free between pages.

use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Registration {
    pub newly_registered: usize,
    pub total_unique: usize,
    pub cap_reached: bool,
}

#[derive(Debug, Default)]
pub struct GlobalCrawlState {
    seen: Mutex<HashSet<String>>,
    max_results: Option<usize>,
    cap_reached: AtomicBool,
}

impl GlobalCrawlState {
    #[must_use]
    pub fn new(max_results: Option<usize>) -> Self {
        Self {
            seen: Mutex::new(HashSet::new()),
            max_results,
            cap_reached: AtomicBool::new(false),
        }
    }

    /// Add identifiers seen on one page. The cap counts as reached once the
    /// number of unique identifiers is at or above it.
    pub fn register<'a, I>(&self, ids: I) -> Registration
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut seen = self.seen.lock();
        let newly_registered = ids
            .into_iter()
            .filter(|id| seen.insert((*id).to_string()))
            .count();
        let total_unique = seen.len();

        let cap_reached = self.max_results.is_some_and(|cap| total_unique >= cap);
        if cap_reached {
            self.cap_reached.store(true, Ordering::Release);
        }

        Registration {
            newly_registered,
            total_unique,
            cap_reached,
        }
    }

    #[must_use]
    pub fn cap_reached(&self) -> bool {
        self.cap_reached.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn total_unique(&self) -> usize {
        self.seen.lock().len()
    }

    #[must_use]
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }
}
