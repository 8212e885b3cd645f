//! Pagination of one practice area, from page 1 to a terminal stop.
//!
//! Stops when a fetch gives nothing back, a page has no cards, a page adds
//! no record this unit has not already collected, the global cap is reached,
//! or the page limit is hit. On any of these the unit's records are written
//! as its checkpoint. An error before that point leaves no checkpoint, so the
//! unit is retried on resume.

use anyhow::{Context, Result};
use log::{debug, info};
use std::sync::Arc;

use super::crawl_types::{StopReason, UnitOutcome, WorkUnit};
use super::progress::ProgressReporter;
use super::state::GlobalCrawlState;
use crate::fetch::PageFetcher;
use crate::models::RecordSet;
use crate::parsers::RecordParser;
use crate::store::CheckpointStore;

/// Builds listing page URLs for one location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingSource {
    pub base_url: String,
    pub state_slug: String,
    pub city_slug: String,
}

impl ListingSource {
    #[must_use]
    pub fn page_url(&self, unit: &str, page: u32) -> String {
        format!(
            "{}/{unit}/{}/{}/?page={page}",
            self.base_url, self.state_slug, self.city_slug
        )
    }

    #[must_use]
    pub fn referer(&self) -> String {
        format!("{}/{}/{}/", self.base_url, self.state_slug, self.city_slug)
    }
}

/// Everything a unit crawl needs, shared by all workers of a run.
pub struct CrawlContext {
    pub fetcher: Arc<dyn PageFetcher>,
    pub parser: Arc<dyn RecordParser>,
    pub state: Arc<GlobalCrawlState>,
    pub checkpoints: CheckpointStore,
    pub source: ListingSource,
    pub max_pages: u32,
    pub total_units: usize,
    pub progress: Arc<dyn ProgressReporter>,
}

/// Crawl `unit` to a terminal stop and checkpoint its records.
pub async fn crawl_unit(ctx: &CrawlContext, unit: &WorkUnit) -> Result<UnitOutcome> {
    let referer = ctx.source.referer();
    let mut records = RecordSet::new();
    let mut pages_fetched = 0;
    let mut stop = StopReason::MaxPages;

    for page in 1..=ctx.max_pages {
        if ctx.state.cap_reached() {
            info!("  [{}] Result cap reached, stopping before page {page}", unit.id);
            stop = StopReason::CapReached;
            break;
        }

        let url = ctx.source.page_url(&unit.id, page);
        let Some(html) = ctx.fetcher.fetch_page(&url, Some(&referer)).await else {
            info!("  [{}] Page {page}: fetch returned nothing, stopping pagination", unit.id);
            stop = StopReason::FetchFailed;
            break;
        };
        pages_fetched += 1;

        let cards = ctx.parser.parse(&html);
        if cards.is_empty() {
            info!("  [{}] Page {page}: 0 cards, stopping pagination", unit.id);
            stop = StopReason::NoCards;
            break;
        }

        let card_count = cards.len();
        let mut new_ids = Vec::new();
        for card in cards {
            let id = card.uuid.clone();
            if records.insert_if_absent(id.clone(), card) {
                new_ids.push(id);
            }
        }

        if new_ids.is_empty() {
            // Sponsored cards repeat on every page
            info!("  [{}] Page {page}: no new attorneys, stopping pagination", unit.id);
            stop = StopReason::NoNewRecords;
            break;
        }

        let registration = ctx.state.register(new_ids.iter().map(String::as_str));
        info!(
            "  [{}] Page {page}: {card_count} cards, {} new (total unique: {})",
            unit.id,
            new_ids.len(),
            registration.total_unique
        );
        ctx.progress.report_page_fetched(
            &unit.id,
            page,
            new_ids.len(),
            registration.total_unique,
        );

        if registration.cap_reached {
            info!("  [{}] Result cap reached after page {page}", unit.id);
            stop = StopReason::CapReached;
            break;
        }
    }

    ctx.checkpoints
        .save(&unit.id, &records)
        .await
        .with_context(|| format!("Failed to persist checkpoint for {}", unit.id))?;

    debug!(
        "[{}] done after {pages_fetched} pages ({stop}), {} records",
        unit.id,
        records.len()
    );
    ctx.progress.report_unit_completed(&unit.id, records.len());

    Ok(UnitOutcome {
        unit: unit.id.clone(),
        records,
        pages_fetched,
        stop,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_urls() {
        let source = ListingSource {
            base_url: "https://attorneys.example.com".into(),
            state_slug: "california".into(),
            city_slug: "los-angeles".into(),
        };
        assert_eq!(
            source.page_url("tax-law", 2),
            "https://attorneys.example.com/tax-law/california/los-angeles/?page=2"
        );
        assert_eq!(source.referer(), "https://attorneys.example.com/california/los-angeles/");
    }
}
