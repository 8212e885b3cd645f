//! Getter methods for `ScrapeConfig`

use std::path::Path;

use super::types::ScrapeConfig;

impl ScrapeConfig {
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    #[must_use]
    pub fn profile_base_url(&self) -> &str {
        &self.profile_base_url
    }

    /// `(min, max)` seconds
    #[must_use]
    pub fn delay_window(&self) -> (f64, f64) {
        (self.delay_min_secs, self.delay_max_secs)
    }

    #[must_use]
    pub fn fetch_concurrency(&self) -> usize {
        self.fetch_concurrency
    }

    #[must_use]
    pub fn workers(&self) -> usize {
        self.workers
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn backoff_base_secs(&self) -> f64 {
        self.backoff_base_secs
    }

    #[must_use]
    pub fn request_timeout_secs(&self) -> u64 {
        self.request_timeout_secs
    }

    #[must_use]
    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    #[must_use]
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    #[must_use]
    pub fn fast_path_enabled(&self) -> bool {
        self.fast_path_enabled
    }

    #[must_use]
    pub fn sweep_concurrency(&self) -> usize {
        self.sweep_concurrency
    }

    #[must_use]
    pub fn sweep_delay_window(&self) -> (f64, f64) {
        (self.sweep_delay_min_secs, self.sweep_delay_max_secs)
    }

    #[must_use]
    pub fn browsers(&self) -> usize {
        self.browsers
    }

    #[must_use]
    pub fn page_settle_secs(&self) -> f64 {
        self.page_settle_secs
    }

    #[must_use]
    pub fn headless(&self) -> bool {
        self.headless
    }

    #[must_use]
    pub fn proxy_url(&self) -> Option<&str> {
        self.proxy_url.as_deref()
    }

    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}
