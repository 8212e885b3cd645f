//! Slow path: render the page in a pooled Chrome instance.
//!
//! The browser cannot report HTTP status, so there is no not-found result
//! here; a 404 page comes back as a body and is left to the parser.

use anyhow::{Context, Result, anyhow};
use chromiumoxide::Page;
use chromiumoxide::cdp::browser_protocol::page::NavigateParams;
use futures::FutureExt;
use futures::future::BoxFuture;
use log::debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::backend::FetchBackend;
use super::challenge::classify_response;
use super::outcome::FetchResult;
use crate::browser_pool::BrowserPool;
use crate::browser_setup::LaunchOptions;
use crate::config::ScrapeConfig;
use crate::crawl_engine::page_timeout::with_page_timeout;

#[derive(Debug, Clone)]
pub struct BrowserBackend {
    pool: Arc<BrowserPool>,
    page_settle: Duration,
    navigation_timeout_secs: u64,
}

impl BrowserBackend {
    #[must_use]
    pub fn new(pool: Arc<BrowserPool>, page_settle: Duration, navigation_timeout_secs: u64) -> Self {
        Self {
            pool,
            page_settle,
            navigation_timeout_secs,
        }
    }

    /// Backend plus a fresh pool sized from `config.browsers()`.
    #[must_use]
    pub fn from_config(config: &ScrapeConfig) -> Self {
        let pool = BrowserPool::new(
            config.browsers(),
            LaunchOptions {
                headless: config.headless(),
                user_agent: config.user_agent().to_string(),
                proxy_url: config.proxy_url().map(str::to_owned),
                request_timeout: config.request_timeout(),
            },
        );
        Self::new(pool, config.page_settle(), config.request_timeout_secs())
    }

    #[must_use]
    pub fn pool(&self) -> &Arc<BrowserPool> {
        &self.pool
    }

    async fn render(&self, url: &str, referer: Option<&str>) -> Result<String> {
        let lease = self.pool.acquire().await?;
        let browser = lease
            .browser()
            .ok_or_else(|| anyhow!("pooled browser missing"))?;

        let opened = with_page_timeout(
            async {
                browser
                    .new_page("about:blank")
                    .await
                    .map_err(|e| anyhow!("Failed to open tab: {e}"))
            },
            self.navigation_timeout_secs,
            "Opening tab",
        )
        .await;
        let page = match opened {
            Ok(page) => page,
            Err(e) => {
                // A browser that cannot open a tab is not reused
                lease.discard();
                return Err(e);
            }
        };

        // If this future is dropped mid-render (the gate's attempt timeout),
        // the tab is closed in the background and the browser is not reused.
        let cleanup_page = page.clone();
        let cleanup_url = url.to_string();
        let guard = CloseOnDrop::new(async move {
            if let Err(e) = cleanup_page.close().await {
                debug!("Failed to close abandoned tab for {cleanup_url}: {e}");
            }
            lease.discard();
        });

        let html = self.load(&page, url, referer).await;

        if let Err(e) = page.close().await {
            debug!("Failed to close tab for {url}: {e}");
        }
        // Completed normally: the lease goes back to the pool
        guard.disarm();
        html
    }

    async fn load(&self, page: &Page, url: &str, referer: Option<&str>) -> Result<String> {
        let mut params = NavigateParams::builder().url(url);
        if let Some(referer) = referer {
            params = params.referrer(referer);
        }
        let params = params
            .build()
            .map_err(|e| anyhow!("Invalid navigation params: {e}"))?;

        with_page_timeout(
            async {
                page.goto(params).await.context("Navigation failed")?;
                page.wait_for_navigation()
                    .await
                    .context("Waiting for navigation failed")?;
                Ok(())
            },
            self.navigation_timeout_secs,
            "Page navigation",
        )
        .await?;

        tokio::time::sleep(self.page_settle).await;
        with_page_timeout(
            async { page.content().await.context("Failed to read page content") },
            self.navigation_timeout_secs,
            "Reading page content",
        )
        .await
    }
}

/// Runs a cleanup future on a background task when dropped while armed.
struct CloseOnDrop {
    cleanup: Option<BoxFuture<'static, ()>>,
}

impl CloseOnDrop {
    fn new<F>(cleanup: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        Self {
            cleanup: Some(cleanup.boxed()),
        }
    }

    /// Drop the cleanup without running it.
    fn disarm(mut self) {
        self.cleanup.take();
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        let Some(cleanup) = self.cleanup.take() else {
            return;
        };
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(cleanup);
            }
            Err(_) => debug!("No runtime to close an abandoned tab"),
        }
    }
}

impl FetchBackend for BrowserBackend {
    fn name(&self) -> &'static str {
        "browser"
    }

    fn fetch<'a>(&'a self, url: &'a str, referer: Option<&'a str>) -> BoxFuture<'a, FetchResult> {
        async move {
            match self.render(url, referer).await {
                Ok(html) => classify_response(200, None, html),
                Err(e) => FetchResult::TransientFailure(format!("{e:#}")),
            }
        }
        .boxed()
    }
}
