//! Derived values computed from a built `ScrapeConfig`
//!
//! Durations, site URLs and the artifact layout of a location's data
//! directory. Phases go through these instead of formatting paths themselves.

use std::path::PathBuf;
use std::time::Duration;

use super::types::ScrapeConfig;
use crate::crawl_engine::ListingSource;

pub const PRACTICE_AREAS_FILE: &str = "practice_areas.json";
pub const LISTINGS_FILE: &str = "listings.json";
pub const PROGRESS_MANIFEST_FILE: &str = "crawl_progress.json";
pub const FETCH_STATUS_FILE: &str = "fetch_status.json";
pub const RECORDS_FILE: &str = "records.json";
pub const HTML_DIR: &str = "html";
pub const LOGS_DIR: &str = "logs";

impl ScrapeConfig {
    /// Same settings, different location directory.
    #[must_use]
    pub fn with_data_dir(&self, dir: impl Into<PathBuf>) -> Self {
        let mut config = self.clone();
        config.data_dir = dir.into();
        config
    }

    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    #[must_use]
    pub fn backoff_base(&self) -> Duration {
        Duration::from_secs_f64(self.backoff_base_secs)
    }

    #[must_use]
    pub fn page_settle(&self) -> Duration {
        Duration::from_secs_f64(self.page_settle_secs)
    }

    /// City index page listing every practice area of a location.
    #[must_use]
    pub fn city_index_url(&self, state_slug: &str, city_slug: &str) -> String {
        format!("{}/{state_slug}/{city_slug}/", self.base_url)
    }

    /// Listing pages of every practice area in one location.
    #[must_use]
    pub fn listing_source(&self, state_slug: &str, city_slug: &str) -> ListingSource {
        ListingSource {
            base_url: self.base_url.clone(),
            state_slug: state_slug.to_string(),
            city_slug: city_slug.to_string(),
        }
    }

    #[must_use]
    pub fn practice_areas_path(&self) -> PathBuf {
        self.data_dir.join(PRACTICE_AREAS_FILE)
    }

    #[must_use]
    pub fn listings_path(&self) -> PathBuf {
        self.data_dir.join(LISTINGS_FILE)
    }

    #[must_use]
    pub fn progress_manifest_path(&self) -> PathBuf {
        self.data_dir.join(PROGRESS_MANIFEST_FILE)
    }

    #[must_use]
    pub fn html_dir(&self) -> PathBuf {
        self.data_dir.join(HTML_DIR)
    }

    #[must_use]
    pub fn fetch_status_path(&self) -> PathBuf {
        self.data_dir.join(FETCH_STATUS_FILE)
    }

    #[must_use]
    pub fn records_path(&self) -> PathBuf {
        self.data_dir.join(RECORDS_FILE)
    }

    #[must_use]
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir.join(LOGS_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ScrapeConfig {
        ScrapeConfig::builder()
            .data_dir("/tmp/data/pasadena_ca")
            .base_url("https://attorneys.example.com/")
            .build()
            .expect("valid config")
    }

    #[test]
    fn listing_url_has_page_query() {
        assert_eq!(
            config()
                .listing_source("california", "pasadena")
                .page_url("personal-injury", 3),
            "https://attorneys.example.com/personal-injury/california/pasadena/?page=3"
        );
    }

    #[test]
    fn city_index_url_keeps_trailing_slash() {
        assert_eq!(
            config().city_index_url("california", "pasadena"),
            "https://attorneys.example.com/california/pasadena/"
        );
    }

    #[test]
    fn artifact_paths_live_in_data_dir() {
        let c = config();
        assert_eq!(c.listings_path(), PathBuf::from("/tmp/data/pasadena_ca/listings.json"));
        assert_eq!(c.html_dir(), PathBuf::from("/tmp/data/pasadena_ca/html"));
        let moved = c.with_data_dir("/tmp/other");
        assert_eq!(moved.records_path(), PathBuf::from("/tmp/other/records.json"));
    }

    #[test]
    fn inverted_delay_window_is_rejected() {
        let err = ScrapeConfig::builder()
            .data_dir("/tmp/x")
            .delay(3.0, 1.0)
            .build()
            .expect_err("inverted window");
        assert!(err.to_string().contains("inverted"));
    }

    #[test]
    fn zero_workers_is_rejected() {
        assert!(
            ScrapeConfig::builder()
                .data_dir("/tmp/x")
                .workers(0)
                .build()
                .is_err()
        );
    }
}
