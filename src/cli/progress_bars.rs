//! Terminal progress bars for the long-running phases.

use kdam::{Animation, Bar, BarExt};
use parking_lot::Mutex;
use std::sync::Arc;

use crate::crawl_engine::{NoOpProgress, ProgressReporter};
use crate::models::FetchStatus;
use crate::utils::NO_PROGRESS_ENV;

/// `ProgressReporter` backed by kdam bars: one bar over practice areas and
/// one counter over profile fetches. Bars are created on first use so a
/// phase only shows the bar it drives.
#[derive(Default)]
pub struct BarProgress {
    units: Mutex<Option<Bar>>,
    fetches: Mutex<Option<Bar>>,
}

impl BarProgress {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bars unless `SUPERLAWYERS_NO_PROGRESS` is set.
    #[must_use]
    pub fn from_env() -> Arc<dyn ProgressReporter> {
        if std::env::var_os(NO_PROGRESS_ENV).is_some() {
            Arc::new(NoOpProgress)
        } else {
            Arc::new(Self::new())
        }
    }
}

impl BarProgress {
    fn units_bar(total: usize) -> Bar {
        kdam::tqdm!(
            total = total,
            desc = "Practice areas",
            animation = Animation::Classic
        )
    }

    fn fetches_bar(total: usize) -> Bar {
        kdam::tqdm!(
            total = total,
            desc = "Profiles",
            animation = Animation::Classic,
            unit = " profiles"
        )
    }
}

impl ProgressReporter for BarProgress {
    fn report_crawl_planned(&self, total: usize, skipped: usize) {
        let mut bar = Self::units_bar(total);
        if skipped > 0 {
            let _ = bar.update(skipped);
        }
        *self.units.lock() = Some(bar);
    }

    fn report_unit_started(&self, _unit: &str, _index: usize, total: usize) {
        let mut units = self.units.lock();
        let bar = units.get_or_insert_with(|| Self::units_bar(total));
        if bar.total != total {
            bar.total = total;
            let _ = bar.refresh();
        }
    }

    fn report_page_fetched(&self, _unit: &str, _page: u32, _new_count: usize, _total_unique: usize) {
    }

    fn report_unit_completed(&self, _unit: &str, _records: usize) {
        if let Some(bar) = self.units.lock().as_mut() {
            let _ = bar.update(1);
        }
    }

    fn report_fetch_planned(&self, total: usize) {
        *self.fetches.lock() = Some(Self::fetches_bar(total));
    }

    fn report_fetch_completed(&self, _id: &str, _status: FetchStatus) {
        let mut fetches = self.fetches.lock();
        let bar = fetches.get_or_insert_with(|| Self::fetches_bar(0));
        let _ = bar.update(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resumed_crawl_starts_at_skipped_units() {
        let progress = BarProgress::new();
        progress.report_crawl_planned(5, 2);
        progress.report_unit_started("tax", 3, 5);
        progress.report_unit_completed("tax", 10);

        let units = progress.units.lock();
        let bar = units.as_ref().expect("units bar");
        assert_eq!(bar.total, 5);
        assert_eq!(bar.counter, 3);
    }

    #[test]
    fn fetch_bar_knows_its_total() {
        let progress = BarProgress::new();
        progress.report_fetch_planned(7);
        progress.report_fetch_completed("u1", FetchStatus::Success);

        let fetches = progress.fetches.lock();
        let bar = fetches.as_ref().expect("fetches bar");
        assert_eq!(bar.total, 7);
        assert_eq!(bar.counter, 1);
    }
}
