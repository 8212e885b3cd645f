//! Per-URL two-tier escalation: fast path first, slow path on anything else.
//!
//! The fast gate runs with [`ChallengeAction::Escalate`](super::ChallengeAction),
//! so a challenge ends its ladder after one attempt and the URL goes straight
//! to the slow gate. Whatever the slow gate returns is final.

use futures::FutureExt;
use futures::future::BoxFuture;
use log::{debug, info};

use super::backend::PageFetcher;
use super::gate::FetchGate;
use super::outcome::GateOutcome;

#[derive(Debug, Clone)]
pub struct EscalatingFetcher {
    fast: Option<FetchGate>,
    slow: FetchGate,
}

impl EscalatingFetcher {
    /// `fast = None` disables the fast path.
    #[must_use]
    pub fn new(fast: Option<FetchGate>, slow: FetchGate) -> Self {
        Self { fast, slow }
    }

    #[must_use]
    pub fn fast_path_enabled(&self) -> bool {
        self.fast.is_some()
    }

    pub async fn fetch(&self, url: &str, referer: Option<&str>) -> Option<String> {
        if let Some(fast) = &self.fast {
            match fast.fetch_outcome(url, referer).await {
                GateOutcome::Body(body) => return Some(body),
                GateOutcome::Challenged => {
                    info!("Fast path challenged for {url}, falling back to browser");
                }
                other => {
                    debug!("Fast path gave {other:?} for {url}, falling back to browser");
                }
            }
        }
        self.slow.fetch(url, referer).await
    }
}

impl PageFetcher for EscalatingFetcher {
    fn fetch_page<'a>(
        &'a self,
        url: &'a str,
        referer: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>> {
        self.fetch(url, referer).boxed()
    }
}
