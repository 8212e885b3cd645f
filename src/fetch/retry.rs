//! Retry policy: a pure backoff ladder plus an outcome classifier.

use std::time::Duration;

use super::outcome::FetchResult;
use crate::config::ScrapeConfig;

/// What a gate does with a challenge response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChallengeAction {
    /// Retry on the same backend, like any transient failure.
    Retry,
    /// Stop immediately and let another backend take the URL.
    Escalate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    Done,
    Retry,
    Fallback,
    Terminal,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    backoff_base: Duration,
    max_attempts: u32,
    on_challenge: ChallengeAction,
}

impl RetryPolicy {
    #[must_use]
    pub fn new(backoff_base: Duration, max_attempts: u32, on_challenge: ChallengeAction) -> Self {
        Self {
            backoff_base,
            max_attempts: max_attempts.max(1),
            on_challenge,
        }
    }

    #[must_use]
    pub fn from_config(config: &ScrapeConfig, on_challenge: ChallengeAction) -> Self {
        Self::new(config.backoff_base(), config.max_attempts(), on_challenge)
    }

    #[must_use]
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    #[must_use]
    pub fn on_challenge(&self) -> ChallengeAction {
        self.on_challenge
    }

    /// Wait after failed attempt `attempt` (1-indexed): `base * 2^(attempt-1)`.
    #[must_use]
    pub fn backoff(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }

    #[must_use]
    pub fn classify(&self, outcome: &FetchResult) -> RetryDecision {
        match outcome {
            FetchResult::Success(_) => RetryDecision::Done,
            FetchResult::NotFound => RetryDecision::Terminal,
            FetchResult::ChallengeDetected => match self.on_challenge {
                ChallengeAction::Retry => RetryDecision::Retry,
                ChallengeAction::Escalate => RetryDecision::Fallback,
            },
            FetchResult::TransientFailure(_) => RetryDecision::Retry,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ladder_doubles() {
        let p = RetryPolicy::new(Duration::from_secs(2), 3, ChallengeAction::Retry);
        assert_eq!(p.backoff(1), Duration::from_secs(2));
        assert_eq!(p.backoff(2), Duration::from_secs(4));
        assert_eq!(p.backoff(3), Duration::from_secs(8));
    }

    #[test]
    fn huge_attempt_does_not_overflow() {
        let p = RetryPolicy::new(Duration::from_secs(2), 3, ChallengeAction::Retry);
        assert!(p.backoff(u32::MAX) >= p.backoff(16));
    }

    #[test]
    fn zero_attempts_clamped_to_one() {
        let p = RetryPolicy::new(Duration::ZERO, 0, ChallengeAction::Retry);
        assert_eq!(p.max_attempts(), 1);
    }
}
