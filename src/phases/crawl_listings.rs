//! The `crawl-listings` phase: every practice area of one location,
//! paginated and merged into `listings.json` next to the input.

use anyhow::Result;
use log::warn;
use std::path::Path;
use std::sync::Arc;

use crate::config::ScrapeConfig;
use crate::crawl_engine::{CrawlError, CrawlJob, CrawlOrchestrator, CrawlSummary, ProgressReporter};
use crate::fetch::{FetchStack, PageFetcher};
use crate::models::PracticeAreaIndex;
use crate::parsers::{RecordParser, parse_listing_page};
use crate::store::read_json;

#[derive(Debug, Clone, Default)]
pub struct CrawlListingsOptions {
    /// Discard checkpoints, manifest and previous output first
    pub force: bool,
    /// Restrict the crawl to these practice areas
    pub practice_areas: Option<Vec<String>>,
}

/// Read `practice_areas.json`. Failure here is fatal for the phase.
pub async fn load_practice_areas(path: &Path) -> Result<PracticeAreaIndex> {
    read_json(path).await.map_err(|e| {
        CrawlError::InputArtifact {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }
        .into()
    })
}

/// Units to crawl: the whole index, or the requested subset in index order.
/// Requested areas missing from the index are warned about and ignored.
#[must_use]
pub fn select_units(index: &PracticeAreaIndex, requested: Option<&[String]>) -> Vec<String> {
    let Some(requested) = requested else {
        return index.practice_areas.clone();
    };
    for unknown in requested
        .iter()
        .filter(|r| !index.practice_areas.contains(r))
    {
        warn!("Unknown practice area '{unknown}' is not in the index, ignoring");
    }
    index
        .practice_areas
        .iter()
        .filter(|pa| requested.contains(pa))
        .cloned()
        .collect()
}

/// Run the phase with an existing fetcher.
pub async fn crawl_listings_with(
    config: &ScrapeConfig,
    input: &Path,
    options: &CrawlListingsOptions,
    fetcher: Arc<dyn PageFetcher>,
    progress: Arc<dyn ProgressReporter>,
) -> Result<CrawlSummary> {
    let index = load_practice_areas(input).await?;
    let config = config.with_data_dir(input.parent().unwrap_or(Path::new(".")));

    let job = CrawlJob {
        source: config.listing_source(&index.state_slug, &index.city_slug),
        units: select_units(&index, options.practice_areas.as_deref()),
        output_path: config.listings_path(),
        manifest_path: config.progress_manifest_path(),
        force: options.force,
    };

    let parser: Arc<dyn RecordParser> = Arc::new(parse_listing_page);
    CrawlOrchestrator::new(&config, fetcher, parser)
        .with_progress(progress)
        .run(job)
        .await
}

/// The `crawl-listings` phase.
pub async fn crawl_listings(
    config: &ScrapeConfig,
    input: &Path,
    options: &CrawlListingsOptions,
    progress: Arc<dyn ProgressReporter>,
) -> Result<CrawlSummary> {
    // Surface an unreadable input before building any client
    load_practice_areas(input).await?;

    let stack = FetchStack::from_config(config)?;
    let fetcher: Arc<dyn PageFetcher> = stack.fetcher.clone();
    let result = crawl_listings_with(config, input, options, fetcher, progress).await;
    stack.shutdown().await;
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> PracticeAreaIndex {
        PracticeAreaIndex {
            state_slug: "california".into(),
            city_slug: "pasadena".into(),
            practice_areas: vec!["bankruptcy".into(), "tax".into(), "trusts".into()],
        }
    }

    #[test]
    fn subset_keeps_index_order_and_drops_unknown() {
        let requested = vec!["trusts".to_string(), "nope".to_string(), "bankruptcy".to_string()];
        assert_eq!(
            select_units(&index(), Some(&requested)),
            vec!["bankruptcy".to_string(), "trusts".to_string()]
        );
        assert_eq!(select_units(&index(), None).len(), 3);
    }
}
