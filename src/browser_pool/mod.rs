//! Fixed-size Chrome pool for the slow path
//!
//! Browsers are launched lazily and reused. At most `size` exist at once;
//! callers beyond that wait for a slot. An idle browser that no longer
//! answers is dropped on checkout and a fresh one launched in its place.

use anyhow::Result;
use chromiumoxide::browser::Browser;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::browser_profile::{BrowserProfile, cleanup_stale_profiles};
use crate::browser_setup::{LaunchOptions, launch_browser};
use crate::crawl_engine::{CrawlError, CrawlResult};

// =============================================================================
// Pool entry
// =============================================================================

/// A launched browser with its CDP event task and profile directory.
///
/// Dropping it stops the event task and deletes the profile.
#[derive(Debug)]
pub struct PooledBrowser {
    pub id: u64,
    browser: Browser,
    events: JoinHandle<()>,
    profile_dir: Option<PathBuf>,
}

impl PooledBrowser {
    #[must_use]
    pub fn browser(&self) -> &Browser {
        &self.browser
    }

    async fn is_alive(&self) -> bool {
        self.browser.version().await.is_ok()
    }
}

impl Drop for PooledBrowser {
    fn drop(&mut self) {
        self.events.abort();
        if let Some(dir) = self.profile_dir.take()
            && let Err(e) = std::fs::remove_dir_all(&dir)
        {
            warn!("Failed to remove browser profile {}: {e}", dir.display());
        }
    }
}

// =============================================================================
// Pool
// =============================================================================

#[derive(Debug)]
pub struct BrowserPool {
    options: LaunchOptions,
    size: usize,
    idle: Mutex<Vec<PooledBrowser>>,
    slots: Arc<Semaphore>,
    launched: AtomicU64,
}

impl BrowserPool {
    /// Empty pool; nothing is launched until the first checkout.
    #[must_use]
    pub fn new(size: usize, options: LaunchOptions) -> Arc<Self> {
        let size = size.max(1);
        Arc::new(Self {
            options,
            size,
            idle: Mutex::new(Vec::with_capacity(size)),
            slots: Arc::new(Semaphore::new(size)),
            launched: AtomicU64::new(0),
        })
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Check out a browser, waiting for a free slot.
    ///
    /// Fails with [`CrawlError::Cancelled`] after [`shutdown`](Self::shutdown)
    /// and [`CrawlError::Browser`] when no browser could be launched.
    pub async fn acquire(self: &Arc<Self>) -> CrawlResult<BrowserLease> {
        let permit = Arc::clone(&self.slots)
            .acquire_owned()
            .await
            .map_err(|_| CrawlError::Cancelled)?;

        let reused = loop {
            let Some(candidate) = self.idle.lock().pop() else {
                break None;
            };
            if candidate.is_alive().await {
                break Some(candidate);
            }
            warn!("Browser {} stopped responding, replacing it", candidate.id);
        };

        let browser = match reused {
            Some(browser) => browser,
            None => self
                .launch()
                .await
                .map_err(|e| CrawlError::Browser(format!("{e:#}")))?,
        };
        debug!("Checked out browser {}", browser.id);

        Ok(BrowserLease {
            browser: Some(browser),
            pool: Arc::clone(self),
            _permit: permit,
        })
    }

    /// Close every idle browser and refuse further checkouts.
    pub async fn shutdown(&self) {
        self.slots.close();
        let idle: Vec<PooledBrowser> = std::mem::take(&mut *self.idle.lock());
        if idle.is_empty() {
            return;
        }
        info!("Closing {} browser(s)", idle.len());
        for mut entry in idle {
            if let Err(e) = entry.browser.close().await {
                warn!("Failed to close browser {}: {e}", entry.id);
            }
            let _ = entry.browser.wait().await;
        }
    }

    async fn launch(&self) -> Result<PooledBrowser> {
        let id = self.launched.fetch_add(1, Ordering::Relaxed);
        if id == 0 {
            // Profiles of crashed earlier runs
            match cleanup_stale_profiles() {
                Ok(0) => {}
                Ok(n) => debug!("Removed {n} stale browser profiles"),
                Err(e) => warn!("Stale profile cleanup failed: {e:#}"),
            }
        }

        let profile_dir = BrowserProfile::create()?.into_path();
        let (browser, events) = launch_browser(&self.options, profile_dir.clone()).await?;
        info!("Launched browser {id} ({} max)", self.size);

        Ok(PooledBrowser {
            id,
            browser,
            events,
            profile_dir: Some(profile_dir),
        })
    }
}

// =============================================================================
// Lease
// =============================================================================

/// A checked-out browser. Returned to the pool on drop unless discarded.
pub struct BrowserLease {
    browser: Option<PooledBrowser>,
    pool: Arc<BrowserPool>,
    _permit: OwnedSemaphorePermit,
}

impl BrowserLease {
    #[must_use]
    pub fn browser(&self) -> Option<&Browser> {
        self.browser.as_ref().map(PooledBrowser::browser)
    }

    /// Close the browser instead of returning it; its slot is freed.
    pub fn discard(mut self) {
        if let Some(entry) = self.browser.take() {
            debug!("Discarding browser {}", entry.id);
        }
    }
}

impl Drop for BrowserLease {
    fn drop(&mut self) {
        if let Some(entry) = self.browser.take() {
            self.pool.idle.lock().push(entry);
        }
    }
}
