//! Fetching: challenge-aware backends behind a rate-limited, retrying gate.
//!
//! - [`FastHttp`]: plain HTTP, cheap, sometimes challenged
//! - [`BrowserBackend`]: pooled Chrome, slow, gets past challenges
//! - [`FetchGate`]: delay, slots, timeout and retry ladder around one backend
//! - [`EscalatingFetcher`]: per-URL fast-then-slow composition

pub mod backend;
pub mod browser;
pub mod challenge;
pub mod escalation;
pub mod gate;
pub mod http;
pub mod outcome;
pub mod retry;

pub use backend::{FetchBackend, PageFetcher};
pub use browser::BrowserBackend;
pub use challenge::{CHALLENGE_MARKERS, classify_response, is_challenge_page};
pub use escalation::EscalatingFetcher;
pub use gate::{FetchGate, jitter_delay};
pub use http::FastHttp;
pub use outcome::{FetchResult, GateOutcome};
pub use retry::{ChallengeAction, RetryDecision, RetryPolicy};

use anyhow::Result;
use std::sync::Arc;

use crate::browser_pool::BrowserPool;
use crate::config::ScrapeConfig;

/// Fast-path gate. Challenges escalate instead of retrying.
pub fn fast_gate(
    config: &ScrapeConfig,
    concurrency: usize,
    delay_window: (f64, f64),
) -> Result<FetchGate> {
    let backend = FastHttp::new(config)?;
    Ok(FetchGate::new(
        Arc::new(backend),
        concurrency,
        delay_window,
        RetryPolicy::from_config(config, ChallengeAction::Escalate),
        config.request_timeout(),
    ))
}

/// Slow-path gate over `backend`. Challenges are retried like transient errors.
#[must_use]
pub fn slow_gate(config: &ScrapeConfig, backend: BrowserBackend, concurrency: usize) -> FetchGate {
    // Navigation and the settle wait both happen inside one attempt
    let attempt_timeout = config.request_timeout() * 2 + config.page_settle();
    FetchGate::new(
        Arc::new(backend),
        concurrency,
        config.delay_window(),
        RetryPolicy::from_config(config, ChallengeAction::Retry),
        attempt_timeout,
    )
}

/// A per-URL escalating fetcher and the browser pool it owns.
#[derive(Debug)]
pub struct FetchStack {
    pub fetcher: Arc<EscalatingFetcher>,
    pool: Arc<BrowserPool>,
}

impl FetchStack {
    /// Build the stack from config. No browser is launched until the slow path is used.
    pub fn from_config(config: &ScrapeConfig) -> Result<Self> {
        let fast = if config.fast_path_enabled() {
            Some(fast_gate(
                config,
                config.fetch_concurrency(),
                config.delay_window(),
            )?)
        } else {
            None
        };

        let backend = BrowserBackend::from_config(config);
        let pool = Arc::clone(backend.pool());
        let slow = slow_gate(config, backend, config.fetch_concurrency());

        Ok(Self {
            fetcher: Arc::new(EscalatingFetcher::new(fast, slow)),
            pool,
        })
    }

    pub async fn shutdown(&self) {
        self.pool.shutdown().await;
    }
}
