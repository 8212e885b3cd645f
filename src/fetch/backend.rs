//! Backend and fetcher seams.

use futures::future::BoxFuture;

use super::outcome::FetchResult;

/// One physical fetch transport (plain HTTP, browser pool, test double).
///
/// Implementations perform exactly one attempt and never retry; delays,
/// slots and retries belong to [`super::FetchGate`].
pub trait FetchBackend: Send + Sync {
    fn name(&self) -> &'static str;

    fn fetch<'a>(&'a self, url: &'a str, referer: Option<&'a str>) -> BoxFuture<'a, FetchResult>;
}

/// "Fetch a URL, give me the body or nothing". What crawlers depend on.
pub trait PageFetcher: Send + Sync {
    fn fetch_page<'a>(
        &'a self,
        url: &'a str,
        referer: Option<&'a str>,
    ) -> BoxFuture<'a, Option<String>>;
}
