//! Tagged results of fetching a URL.

use std::fmt;

/// Outcome of one physical fetch attempt against a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchResult {
    Success(String),
    /// 404-equivalent. Permanent, never retried.
    NotFound,
    /// The response was a bot challenge instead of content.
    ChallengeDetected,
    /// Timeout, 5xx, transport error.
    TransientFailure(String),
}

impl FetchResult {
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }
}

impl fmt::Display for FetchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success(body) => write!(f, "success ({} bytes)", body.len()),
            Self::NotFound => f.write_str("not found"),
            Self::ChallengeDetected => f.write_str("bot challenge detected"),
            Self::TransientFailure(reason) => write!(f, "transient failure: {reason}"),
        }
    }
}

/// Outcome of a full gated fetch, after delays and retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateOutcome {
    Body(String),
    NotFound,
    /// A challenge ended the attempt ladder early so another backend can take over.
    Challenged,
    /// Every attempt failed; carries the last error.
    Exhausted(String),
}

impl GateOutcome {
    #[must_use]
    pub fn into_body(self) -> Option<String> {
        match self {
            Self::Body(body) => Some(body),
            _ => None,
        }
    }
}
