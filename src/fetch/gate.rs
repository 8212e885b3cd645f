//! FetchGate: rate-limited, slot-bounded, retried access to one backend.
//!
//! Per physical attempt:
//! 1. sleep a random delay from the configured window (before taking a slot,
//!    so a throttled task never holds one)
//! 2. acquire one of the gate's fetch slots
//! 3. run the backend under the per-attempt timeout
//! 4. classify the result with the [`RetryPolicy`]
//!
//! Ordinary network trouble never surfaces as an error: callers get a
//! [`GateOutcome`] or an `Option<String>`.

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, error, warn};
use rand::Rng;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;

use super::backend::{FetchBackend, PageFetcher};
use super::outcome::{FetchResult, GateOutcome};
use super::retry::{RetryDecision, RetryPolicy};

/// Uniform random delay in `[min, max]` seconds.
///
/// Kept synchronous so the thread-local RNG is never held across an await.
#[must_use]
pub fn jitter_delay(window: (f64, f64)) -> Duration {
    let (min, max) = window;
    if max <= min {
        return Duration::from_secs_f64(min.max(0.0));
    }
    Duration::from_secs_f64(rand::rng().random_range(min..=max))
}

#[derive(Clone)]
pub struct FetchGate {
    backend: Arc<dyn FetchBackend>,
    slots: Arc<Semaphore>,
    delay_window: (f64, f64),
    policy: RetryPolicy,
    attempt_timeout: Duration,
}

impl std::fmt::Debug for FetchGate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetchGate")
            .field("backend", &self.backend_name())
            .field("available_slots", &self.slots.available_permits())
            .field("delay_window", &self.delay_window)
            .field("policy", &self.policy)
            .field("attempt_timeout", &self.attempt_timeout)
            .finish()
    }
}

impl FetchGate {
    #[must_use]
    pub fn new(
        backend: Arc<dyn FetchBackend>,
        concurrency: usize,
        delay_window: (f64, f64),
        policy: RetryPolicy,
        attempt_timeout: Duration,
    ) -> Self {
        Self {
            backend,
            slots: Arc::new(Semaphore::new(concurrency.max(1))),
            delay_window,
            policy,
            attempt_timeout,
        }
    }

    #[must_use]
    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    #[must_use]
    pub fn policy(&self) -> &RetryPolicy {
        &self.policy
    }

    async fn attempt(&self, url: &str, referer: Option<&str>) -> FetchResult {
        let delay = jitter_delay(self.delay_window);
        if !delay.is_zero() {
            debug!("Sleeping {:.1}s before request to {url}", delay.as_secs_f64());
            tokio::time::sleep(delay).await;
        }

        let Ok(_permit) = self.slots.acquire().await else {
            return FetchResult::TransientFailure("fetch slots closed".to_string());
        };

        debug!("[{}] Fetching: {url}", self.backend_name());
        match tokio::time::timeout(self.attempt_timeout, self.backend.fetch(url, referer)).await {
            Ok(result) => result,
            Err(_) => FetchResult::TransientFailure(format!(
                "timed out after {}s",
                self.attempt_timeout.as_secs_f64()
            )),
        }
    }

    /// Run the full attempt ladder for `url`.
    pub async fn fetch_outcome(&self, url: &str, referer: Option<&str>) -> GateOutcome {
        let max = self.policy.max_attempts();
        let backend = self.backend_name();
        let mut last_error = String::from("no attempt made");

        for attempt in 1..=max {
            let result = self.attempt(url, referer).await;
            match (self.policy.classify(&result), result) {
                (RetryDecision::Done, FetchResult::Success(body)) => {
                    debug!("[{backend}] Fetched {url}: {} chars", body.len());
                    return GateOutcome::Body(body);
                }
                (RetryDecision::Terminal, _) => {
                    warn!("[{backend}] 404 Not Found: {url}");
                    return GateOutcome::NotFound;
                }
                (RetryDecision::Fallback, _) => {
                    warn!("[{backend}] Challenge detected for {url}, handing off");
                    return GateOutcome::Challenged;
                }
                (_, failure) => {
                    last_error = failure.to_string();
                    if attempt < max {
                        let wait = self.policy.backoff(attempt);
                        warn!(
                            "[{backend}] Attempt {attempt}/{max} for {url} failed: {last_error}; retrying in {:.1}s",
                            wait.as_secs_f64()
                        );
                        tokio::time::sleep(wait).await;
                    }
                }
            }
        }

        error!("[{backend}] All {max} attempts exhausted for {url}: {last_error}");
        GateOutcome::Exhausted(last_error)
    }

    /// Body, or `None` when absent or every attempt failed.
    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> Option<String> {
        self.fetch_outcome(url, referer).await.into_body()
    }
}

impl PageFetcher for FetchGate {
    fn fetch_page<'a>(
        &'a self,
        url: &'a str,
        referer: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>> {
        self.fetch(url, referer).boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jitter_stays_in_window() {
        for _ in 0..100 {
            let d = jitter_delay((0.2, 0.8)).as_secs_f64();
            assert!((0.2..=0.8).contains(&d));
        }
    }

    #[test]
    fn degenerate_window_is_fixed() {
        assert_eq!(jitter_delay((0.0, 0.0)), Duration::ZERO);
        assert_eq!(jitter_delay((1.5, 1.0)), Duration::from_secs_f64(1.5));
    }
}
