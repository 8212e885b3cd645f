//! Test utilities and scripted fetchers for the attorney_scrape test suite

use attorney_scrape::config::ScrapeConfig;
use attorney_scrape::crawl_engine::{ListingSource, ProgressReporter};
use attorney_scrape::models::FetchStatus;
use attorney_scrape::fetch::{FetchBackend, FetchResult, PageFetcher};
use futures::FutureExt;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[allow(dead_code)]
pub const BASE_URL: &str = "https://attorneys.example.com";

/// Deterministic 36-character profile identifier
#[allow(dead_code)]
pub fn attorney_id(seed: u32, n: u32) -> String {
    format!("{seed:08x}-0000-4000-8000-{n:012x}")
}

/// One listing card whose profile link carries `id`
#[allow(dead_code)]
pub fn listing_card(id: &str, name: &str) -> String {
    format!(
        r#"<div class="serp-container">
    <h2 class="full-name"><a href="https://profiles.example.com/california/pasadena/lawyer/{slug}/{id}.html?adSubId=1">{name}</a></h2>
    <a class="single-link" href="/lawfirm/{slug}">{name} Law</a>
    <a href="tel:+16265550100">Call</a>
</div>"#,
        slug = name.to_lowercase().replace(' ', "-")
    )
}

/// A listing page with one card per id, named after the id
#[allow(dead_code)]
pub fn listing_page(ids: &[&str]) -> String {
    let cards: Vec<(&str, String)> = ids.iter().map(|id| (*id, format!("Attorney {id}"))).collect();
    let named: Vec<(&str, &str)> = cards.iter().map(|(id, n)| (*id, n.as_str())).collect();
    listing_page_named(&named)
}

#[allow(dead_code)]
pub fn listing_page_named(cards: &[(&str, &str)]) -> String {
    let body: String = cards.iter().map(|(id, name)| listing_card(id, name)).collect();
    format!("<!DOCTYPE html><html><head><title>Listings</title></head><body>{body}</body></html>")
}

#[allow(dead_code)]
pub fn source() -> ListingSource {
    ListingSource {
        base_url: BASE_URL.to_string(),
        state_slug: "california".to_string(),
        city_slug: "pasadena".to_string(),
    }
}

/// Config with every delay and backoff at zero
#[allow(dead_code)]
pub fn test_config(dir: &Path, workers: usize, max_results: Option<usize>) -> ScrapeConfig {
    ScrapeConfig::builder()
        .data_dir(dir)
        .base_url(BASE_URL)
        .delay(0.0, 0.0)
        .sweep_delay(0.0, 0.0)
        .backoff_base_secs(0.0)
        .workers(workers)
        .max_results(max_results)
        .build()
        .expect("test config should be valid")
}

// ============================================================================
// Scripted page fetcher
// ============================================================================

/// `PageFetcher` serving fixed pages by URL; anything else is `None`.
#[derive(Default)]
pub struct ScriptedFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// Serve `pages` as pages 1..=n of `unit`
    pub fn with_unit(mut self, unit: &str, pages: &[String]) -> Self {
        let source = source();
        for (i, html) in pages.iter().enumerate() {
            self.pages
                .insert(source.page_url(unit, i as u32 + 1), html.clone());
        }
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }

    /// Requests whose URL belongs to `unit`
    pub fn calls_for(&self, unit: &str) -> usize {
        let prefix = format!("{BASE_URL}/{unit}/");
        self.calls
            .lock()
            .iter()
            .filter(|u| u.starts_with(&prefix))
            .count()
    }
}

impl PageFetcher for ScriptedFetcher {
    fn fetch_page<'a>(
        &'a self,
        url: &'a str,
        _referer: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>> {
        self.calls.lock().push(url.to_string());
        let page = self.pages.get(url).cloned();
        async move { page }.boxed()
    }
}

// ============================================================================
// Scripted backend
// ============================================================================

/// `FetchBackend` replaying a queue of results per URL, then a fallback.
pub struct ScriptedBackend {
    name: &'static str,
    queues: Mutex<HashMap<String, VecDeque<FetchResult>>>,
    fallback: FetchResult,
    calls: Mutex<HashMap<String, usize>>,
}

#[allow(dead_code)]
impl ScriptedBackend {
    pub fn new(name: &'static str, fallback: FetchResult) -> Self {
        Self {
            name,
            queues: Mutex::new(HashMap::new()),
            fallback,
            calls: Mutex::new(HashMap::new()),
        }
    }

    pub fn script(self, url: &str, results: Vec<FetchResult>) -> Self {
        self.queues.lock().insert(url.to_string(), results.into());
        self
    }

    pub fn calls_to(&self, url: &str) -> usize {
        self.calls.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }
}

impl FetchBackend for ScriptedBackend {
    fn name(&self) -> &'static str {
        self.name
    }

    fn fetch<'a>(&'a self, url: &'a str, _referer: Option<&'a str>) -> BoxFuture<'a, FetchResult> {
        *self.calls.lock().entry(url.to_string()).or_default() += 1;
        let result = self
            .queues
            .lock()
            .get_mut(url)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| self.fallback.clone());
        async move { result }.boxed()
    }
}

// ============================================================================
// Concurrency tracking
// ============================================================================

/// Current and peak number of overlapping calls
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct InFlight {
    current: AtomicUsize,
    peak: AtomicUsize,
}

#[allow(dead_code)]
impl InFlight {
    pub fn enter(&self) -> InFlightGuard<'_> {
        let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        InFlightGuard(self)
    }

    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[allow(dead_code)]
pub struct InFlightGuard<'a>(&'a InFlight);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.current.fetch_sub(1, Ordering::SeqCst);
    }
}

/// `FetchBackend` holding every call for `hold`, serving fixed bodies by URL
/// and `fallback` otherwise.
#[allow(dead_code)]
pub struct PacedBackend {
    hold: Duration,
    pages: HashMap<String, String>,
    fallback: FetchResult,
    in_flight: InFlight,
    calls: AtomicUsize,
}

#[allow(dead_code)]
impl PacedBackend {
    pub fn new(hold: Duration, fallback: FetchResult) -> Self {
        Self {
            hold,
            pages: HashMap::new(),
            fallback,
            in_flight: InFlight::default(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Serve `pages` as pages 1..=n of `unit`
    pub fn with_unit(mut self, unit: &str, pages: &[String]) -> Self {
        let source = source();
        for (i, html) in pages.iter().enumerate() {
            self.pages
                .insert(source.page_url(unit, i as u32 + 1), html.clone());
        }
        self
    }

    pub fn peak(&self) -> usize {
        self.in_flight.peak()
    }

    pub fn total_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl FetchBackend for PacedBackend {
    fn name(&self) -> &'static str {
        "paced"
    }

    fn fetch<'a>(&'a self, url: &'a str, _referer: Option<&'a str>) -> BoxFuture<'a, FetchResult> {
        async move {
            let _busy = self.in_flight.enter();
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.hold).await;
            self.pages
                .get(url)
                .map_or_else(|| self.fallback.clone(), |html| FetchResult::Success(html.clone()))
        }
        .boxed()
    }
}

/// `ScriptedFetcher` that holds every request for `hold`
#[allow(dead_code)]
pub struct PacedFetcher {
    inner: ScriptedFetcher,
    hold: Duration,
    in_flight: InFlight,
}

#[allow(dead_code)]
impl PacedFetcher {
    pub fn new(inner: ScriptedFetcher, hold: Duration) -> Self {
        Self {
            inner,
            hold,
            in_flight: InFlight::default(),
        }
    }

    pub fn peak(&self) -> usize {
        self.in_flight.peak()
    }
}

impl PageFetcher for PacedFetcher {
    fn fetch_page<'a>(
        &'a self,
        url: &'a str,
        referer: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>> {
        async move {
            let _busy = self.in_flight.enter();
            tokio::time::sleep(self.hold).await;
            self.inner.fetch_page(url, referer).await
        }
        .boxed()
    }
}

// ============================================================================
// Recording progress
// ============================================================================

/// `ProgressReporter` keeping the planning calls and completion counts
#[allow(dead_code)]
#[derive(Default)]
pub struct RecordingProgress {
    pub crawl_plans: Mutex<Vec<(usize, usize)>>,
    pub fetch_plans: Mutex<Vec<usize>>,
    pub units_completed: AtomicUsize,
    pub fetches_completed: AtomicUsize,
}

impl ProgressReporter for RecordingProgress {
    fn report_crawl_planned(&self, total: usize, skipped: usize) {
        self.crawl_plans.lock().push((total, skipped));
    }

    fn report_unit_started(&self, _unit: &str, _index: usize, _total: usize) {}

    fn report_page_fetched(&self, _unit: &str, _page: u32, _new_count: usize, _total_unique: usize) {
    }

    fn report_unit_completed(&self, _unit: &str, _records: usize) {
        self.units_completed.fetch_add(1, Ordering::SeqCst);
    }

    fn report_fetch_planned(&self, total: usize) {
        self.fetch_plans.lock().push(total);
    }

    fn report_fetch_completed(&self, _id: &str, _status: FetchStatus) {
        self.fetches_completed.fetch_add(1, Ordering::SeqCst);
    }
}
