//! `run`: all five phases for one location, each feeding the next.

use anyhow::{Result, bail};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::crawl_listings::{CrawlListingsOptions, crawl_listings};
use super::discover::discover;
use super::export::export;
use super::fetch_profiles::{FetchProfilesOptions, fetch_profiles};
use super::parse_profiles::parse_profiles;
use crate::config::ScrapeConfig;
use crate::crawl_engine::ProgressReporter;

/// Chain discover, crawl-listings, fetch-profiles, parse-profiles and export.
/// `config.data_dir()` is the data root. Returns the CSV path.
pub async fn run_pipeline(
    config: &ScrapeConfig,
    location: &str,
    output_dir: &Path,
    progress: Arc<dyn ProgressReporter>,
) -> Result<PathBuf> {
    info!("=== Phase 1: Discover ===");
    let practice_areas_path = discover(config, location).await?;

    info!("=== Phase 2: Crawl listings ===");
    let summary = crawl_listings(
        config,
        &practice_areas_path,
        &CrawlListingsOptions::default(),
        Arc::clone(&progress),
    )
    .await?;
    if !summary.is_success() {
        bail!(
            "{} practice area(s) failed ({}); rerun to resume from checkpoints",
            summary.failed_units.len(),
            summary.failed_units.join(", ")
        );
    }

    info!("=== Phase 3: Fetch profiles ===");
    let fetched = fetch_profiles(
        config,
        &summary.output_path,
        FetchProfilesOptions::default(),
        progress,
    )
    .await?;

    info!("=== Phase 4: Parse profiles ===");
    let parsed = parse_profiles(config, &fetched.data_dir).await?;

    info!("=== Phase 5: Export ===");
    export(&parsed.output_path, output_dir).await
}
