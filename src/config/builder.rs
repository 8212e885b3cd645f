//! Type-safe builder for `ScrapeConfig` using the typestate pattern
//!
//! The data directory is the one required field; `build()` only exists once
//! it has been set. Everything else starts at the defaults in
//! [`crate::utils::constants`] and is validated when the config is built.

use crate::utils::{
    CHROME_USER_AGENT, DEFAULT_BACKOFF_BASE_SECS, DEFAULT_BASE_URL, DEFAULT_BROWSERS,
    DEFAULT_DELAY_MAX_SECS, DEFAULT_DELAY_MIN_SECS, DEFAULT_FETCH_CONCURRENCY,
    DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_PAGES, DEFAULT_PAGE_SETTLE_SECS, DEFAULT_PROFILE_BASE_URL,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_SWEEP_CONCURRENCY, DEFAULT_SWEEP_DELAY_MAX_SECS,
    DEFAULT_SWEEP_DELAY_MIN_SECS, DEFAULT_WORKERS,
};
use anyhow::{Result, anyhow, bail};
use std::marker::PhantomData;
use std::path::PathBuf;

use super::types::ScrapeConfig;

/// Reject an inverted or negative delay window.
fn validate_window(name: &str, min: f64, max: f64) -> Result<()> {
    if !(min.is_finite() && max.is_finite()) || min < 0.0 {
        bail!("{name} delay window must be finite and non-negative, got [{min}, {max}]");
    }
    if min > max {
        bail!("{name} delay window is inverted: min {min} > max {max}");
    }
    Ok(())
}

fn validate_base_url(name: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value).map_err(|e| anyhow!("Invalid {name} '{value}': {e}"))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        bail!("{name} must be http(s), got '{value}'");
    }
    Ok(())
}

// Type states for the builder
pub struct WithDataDir;

pub struct ScrapeConfigBuilder<State = ()> {
    pub(crate) data_dir: Option<PathBuf>,
    pub(crate) base_url: String,
    pub(crate) profile_base_url: String,
    pub(crate) delay_min_secs: f64,
    pub(crate) delay_max_secs: f64,
    pub(crate) fetch_concurrency: usize,
    pub(crate) workers: usize,
    pub(crate) max_attempts: u32,
    pub(crate) backoff_base_secs: f64,
    pub(crate) request_timeout_secs: u64,
    pub(crate) max_pages: u32,
    pub(crate) max_results: Option<usize>,
    pub(crate) fast_path_enabled: bool,
    pub(crate) sweep_concurrency: usize,
    pub(crate) sweep_delay_min_secs: f64,
    pub(crate) sweep_delay_max_secs: f64,
    pub(crate) browsers: usize,
    pub(crate) page_settle_secs: f64,
    pub(crate) headless: bool,
    pub(crate) proxy_url: Option<String>,
    pub(crate) user_agent: String,
    pub(crate) _phantom: PhantomData<State>,
}

impl Default for ScrapeConfigBuilder<()> {
    fn default() -> Self {
        Self {
            data_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            profile_base_url: DEFAULT_PROFILE_BASE_URL.to_string(),
            delay_min_secs: DEFAULT_DELAY_MIN_SECS,
            delay_max_secs: DEFAULT_DELAY_MAX_SECS,
            fetch_concurrency: DEFAULT_FETCH_CONCURRENCY,
            workers: DEFAULT_WORKERS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            backoff_base_secs: DEFAULT_BACKOFF_BASE_SECS,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            max_pages: DEFAULT_MAX_PAGES,
            max_results: None,
            fast_path_enabled: true,
            sweep_concurrency: DEFAULT_SWEEP_CONCURRENCY,
            sweep_delay_min_secs: DEFAULT_SWEEP_DELAY_MIN_SECS,
            sweep_delay_max_secs: DEFAULT_SWEEP_DELAY_MAX_SECS,
            browsers: DEFAULT_BROWSERS,
            page_settle_secs: DEFAULT_PAGE_SETTLE_SECS,
            headless: true,
            proxy_url: None,
            user_agent: CHROME_USER_AGENT.to_string(),
            _phantom: PhantomData,
        }
    }
}

impl ScrapeConfig {
    /// Create a builder for configuring a `ScrapeConfig` with a fluent interface
    #[must_use]
    pub fn builder() -> ScrapeConfigBuilder<()> {
        ScrapeConfigBuilder::default()
    }
}

impl ScrapeConfigBuilder<()> {
    pub fn data_dir(self, dir: impl Into<PathBuf>) -> ScrapeConfigBuilder<WithDataDir> {
        ScrapeConfigBuilder {
            data_dir: Some(dir.into()),
            base_url: self.base_url,
            profile_base_url: self.profile_base_url,
            delay_min_secs: self.delay_min_secs,
            delay_max_secs: self.delay_max_secs,
            fetch_concurrency: self.fetch_concurrency,
            workers: self.workers,
            max_attempts: self.max_attempts,
            backoff_base_secs: self.backoff_base_secs,
            request_timeout_secs: self.request_timeout_secs,
            max_pages: self.max_pages,
            max_results: self.max_results,
            fast_path_enabled: self.fast_path_enabled,
            sweep_concurrency: self.sweep_concurrency,
            sweep_delay_min_secs: self.sweep_delay_min_secs,
            sweep_delay_max_secs: self.sweep_delay_max_secs,
            browsers: self.browsers,
            page_settle_secs: self.page_settle_secs,
            headless: self.headless,
            proxy_url: self.proxy_url,
            user_agent: self.user_agent,
            _phantom: PhantomData,
        }
    }
}

// Build method only available when all required fields are set
impl ScrapeConfigBuilder<WithDataDir> {
    pub fn build(self) -> Result<ScrapeConfig> {
        validate_window("fetch", self.delay_min_secs, self.delay_max_secs)?;
        validate_window("sweep", self.sweep_delay_min_secs, self.sweep_delay_max_secs)?;
        validate_base_url("base_url", &self.base_url)?;
        validate_base_url("profile_base_url", &self.profile_base_url)?;

        if self.workers == 0 {
            bail!("workers must be at least 1");
        }
        if self.fetch_concurrency == 0 || self.sweep_concurrency == 0 {
            bail!("fetch and sweep concurrency must be at least 1");
        }
        if self.browsers == 0 {
            bail!("browsers must be at least 1");
        }
        if self.max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }
        if self.max_pages == 0 {
            bail!("max_pages must be at least 1");
        }
        if !self.backoff_base_secs.is_finite() || self.backoff_base_secs < 0.0 {
            bail!("backoff_base_secs must be finite and non-negative");
        }
        if !self.page_settle_secs.is_finite() || self.page_settle_secs < 0.0 {
            bail!("page_settle_secs must be finite and non-negative");
        }
        if self.max_results == Some(0) {
            bail!("max_results must be at least 1 when set");
        }

        Ok(ScrapeConfig {
            data_dir: self
                .data_dir
                .ok_or_else(|| anyhow!("data_dir is required"))?,
            base_url: self.base_url.trim_end_matches('/').to_string(),
            profile_base_url: self.profile_base_url.trim_end_matches('/').to_string(),
            delay_min_secs: self.delay_min_secs,
            delay_max_secs: self.delay_max_secs,
            fetch_concurrency: self.fetch_concurrency,
            workers: self.workers,
            max_attempts: self.max_attempts,
            backoff_base_secs: self.backoff_base_secs,
            request_timeout_secs: self.request_timeout_secs,
            max_pages: self.max_pages,
            max_results: self.max_results,
            fast_path_enabled: self.fast_path_enabled,
            sweep_concurrency: self.sweep_concurrency,
            sweep_delay_min_secs: self.sweep_delay_min_secs,
            sweep_delay_max_secs: self.sweep_delay_max_secs,
            browsers: self.browsers,
            page_settle_secs: self.page_settle_secs,
            headless: self.headless,
            proxy_url: self.proxy_url,
            user_agent: self.user_agent,
        })
    }
}

// Builder methods available at any state
impl<State> ScrapeConfigBuilder<State> {
    #[must_use]
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    #[must_use]
    pub fn profile_base_url(mut self, url: impl Into<String>) -> Self {
        self.profile_base_url = url.into();
        self
    }

    /// Set the random delay window slept before each physical fetch attempt
    ///
    /// Tests typically pass `(0.0, 0.0)` to make runs instant.
    ///
    /// # Example
    /// ```rust
    /// # use attorney_scrape::config::ScrapeConfig;
    /// # fn main() -> anyhow::Result<()> {
    /// let config = ScrapeConfig::builder()
    ///     .data_dir("./data/pasadena_ca")
    ///     .delay(0.5, 1.5)
    ///     .build()?;
    /// assert_eq!(config.delay_window(), (0.5, 1.5));
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn delay(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.delay_min_secs = min_secs;
        self.delay_max_secs = max_secs;
        self
    }

    #[must_use]
    pub fn fetch_concurrency(mut self, slots: usize) -> Self {
        self.fetch_concurrency = slots;
        self
    }

    #[must_use]
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    #[must_use]
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    #[must_use]
    pub fn backoff_base_secs(mut self, secs: f64) -> Self {
        self.backoff_base_secs = secs;
        self
    }

    #[must_use]
    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    #[must_use]
    pub fn max_pages(mut self, pages: u32) -> Self {
        self.max_pages = pages;
        self
    }

    #[must_use]
    pub fn max_results(mut self, cap: Option<usize>) -> Self {
        self.max_results = cap;
        self
    }

    #[must_use]
    pub fn fast_path_enabled(mut self, enabled: bool) -> Self {
        self.fast_path_enabled = enabled;
        self
    }

    #[must_use]
    pub fn sweep_concurrency(mut self, slots: usize) -> Self {
        self.sweep_concurrency = slots;
        self
    }

    #[must_use]
    pub fn sweep_delay(mut self, min_secs: f64, max_secs: f64) -> Self {
        self.sweep_delay_min_secs = min_secs;
        self.sweep_delay_max_secs = max_secs;
        self
    }

    #[must_use]
    pub fn browsers(mut self, browsers: usize) -> Self {
        self.browsers = browsers;
        self
    }

    #[must_use]
    pub fn page_settle_secs(mut self, secs: f64) -> Self {
        self.page_settle_secs = secs;
        self
    }

    #[must_use]
    pub fn headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    #[must_use]
    pub fn proxy_url(mut self, proxy: Option<String>) -> Self {
        self.proxy_url = proxy.filter(|p| !p.trim().is_empty());
        self
    }

    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = ua.into();
        self
    }
}
