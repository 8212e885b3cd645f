//! The `fetch-profiles` phase: raw profile HTML for every listed attorney.
//!
//! Each profile is saved as `html/{uuid}.html`; an existing file counts as
//! done unless `force` is set (or `retry_challenged` finds it is a challenge
//! page). Per-profile results go to `fetch_status.json`.

use anyhow::{Context, Result};
use log::info;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::io::AsyncReadExt;

use crate::config::ScrapeConfig;
use crate::crawl_engine::{BulkFetcher, CrawlError, ProfileJob, ProgressReporter};
use crate::fetch::{BrowserBackend, fast_gate, is_challenge_page, slow_gate};
use crate::models::{FetchStatus, FetchStatusMap, RecordSet};
use crate::store::{read_json, write_json_atomic};
use crate::utils::{CHALLENGE_SNIFF_BYTES, join_url};

#[derive(Debug, Clone, Copy, Default)]
pub struct FetchProfilesOptions {
    /// Re-download files that already exist
    pub force: bool,
    /// Re-download existing files that are challenge pages
    pub retry_challenged: bool,
}

#[derive(Debug, Clone)]
pub struct FetchProfilesReport {
    pub data_dir: PathBuf,
    pub statuses: FetchStatusMap,
}

impl FetchProfilesReport {
    #[must_use]
    pub fn count(&self, status: FetchStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }
}

pub async fn load_listings(path: &Path) -> Result<RecordSet> {
    read_json(path).await.map_err(|e| {
        CrawlError::InputArtifact {
            path: path.to_path_buf(),
            reason: format!("{e:#}"),
        }
        .into()
    })
}

/// Whether the first bytes of a saved page look like a challenge.
async fn saved_page_is_challenge(path: &Path) -> bool {
    let Ok(file) = tokio::fs::File::open(path).await else {
        return false;
    };
    let mut head = Vec::with_capacity(CHALLENGE_SNIFF_BYTES);
    if file
        .take(CHALLENGE_SNIFF_BYTES as u64)
        .read_to_end(&mut head)
        .await
        .is_err()
    {
        return false;
    }
    is_challenge_page(&String::from_utf8_lossy(&head))
}

/// Listing links are absolute; a site-relative one is resolved against the
/// profile host.
fn profile_url(config: &ScrapeConfig, url: &str) -> String {
    if url.starts_with('/') {
        join_url(config.profile_base_url(), url)
    } else {
        url.to_string()
    }
}

struct PreparedFetch {
    config: ScrapeConfig,
    jobs: Vec<ProfileJob>,
    statuses: FetchStatusMap,
}

async fn prepare(
    config: &ScrapeConfig,
    listings_path: &Path,
    options: FetchProfilesOptions,
) -> Result<PreparedFetch> {
    let listings = load_listings(listings_path).await?;
    let config = config.with_data_dir(listings_path.parent().unwrap_or(Path::new(".")));
    let html_dir = config.html_dir();
    tokio::fs::create_dir_all(&html_dir)
        .await
        .map_err(|e| CrawlError::OutputDir {
            path: html_dir.clone(),
            reason: e.to_string(),
        })?;

    let mut jobs = Vec::new();
    let mut statuses = FetchStatusMap::new();
    for (uuid, record) in listings.iter() {
        let path = html_dir.join(format!("{}.html", sanitize_filename::sanitize(uuid)));
        let refetch = options.force
            || !path.exists()
            || (options.retry_challenged && saved_page_is_challenge(&path).await);
        if refetch {
            jobs.push(ProfileJob::new(uuid, profile_url(&config, &record.profile_url)));
        } else {
            statuses.insert(uuid.to_string(), FetchStatus::Skipped);
        }
    }

    info!(
        "Profiles to fetch: {} (skipping {} already on disk)",
        jobs.len(),
        statuses.len()
    );
    Ok(PreparedFetch {
        config,
        jobs,
        statuses,
    })
}

async fn finish(mut prepared: PreparedFetch, fetched: Option<FetchStatusMap>) -> Result<FetchProfilesReport> {
    if let Some(fetched) = fetched {
        prepared.statuses.extend(fetched);
    }
    let status_path = prepared.config.fetch_status_path();
    write_json_atomic(&status_path, &prepared.statuses)
        .await
        .with_context(|| format!("Failed to write {}", status_path.display()))?;

    let report = FetchProfilesReport {
        data_dir: prepared.config.data_dir().to_path_buf(),
        statuses: prepared.statuses,
    };
    info!(
        "Fetch complete: {} success, {} failed, {} skipped",
        report.count(FetchStatus::Success),
        report.count(FetchStatus::Failed),
        report.count(FetchStatus::Skipped)
    );
    Ok(report)
}

/// Build the two-phase fetcher the phase uses: a fast sweep (when enabled)
/// and a browser slow path batched by `browsers`.
pub fn bulk_fetcher(config: &ScrapeConfig, backend: BrowserBackend) -> Result<BulkFetcher> {
    let sweep = if config.fast_path_enabled() {
        Some(fast_gate(
            config,
            config.sweep_concurrency(),
            config.sweep_delay_window(),
        )?)
    } else {
        None
    };
    let slow = slow_gate(config, backend, config.browsers());
    Ok(BulkFetcher::new(
        sweep,
        slow,
        config.sweep_concurrency(),
        config.browsers(),
    ))
}

/// Run the phase with an existing bulk fetcher.
pub async fn fetch_profiles_with(
    config: &ScrapeConfig,
    listings_path: &Path,
    options: FetchProfilesOptions,
    bulk: &BulkFetcher,
) -> Result<FetchProfilesReport> {
    let mut prepared = prepare(config, listings_path, options).await?;
    if prepared.jobs.is_empty() {
        return finish(prepared, None).await;
    }
    let jobs = std::mem::take(&mut prepared.jobs);
    let report = bulk
        .fetch_all(jobs, &prepared.config.html_dir(), Some(prepared.config.base_url()))
        .await?;
    finish(prepared, Some(report.statuses)).await
}

/// The `fetch-profiles` phase. No client or browser is created when every
/// profile is already on disk.
pub async fn fetch_profiles(
    config: &ScrapeConfig,
    listings_path: &Path,
    options: FetchProfilesOptions,
    progress: Arc<dyn ProgressReporter>,
) -> Result<FetchProfilesReport> {
    let mut prepared = prepare(config, listings_path, options).await?;
    if prepared.jobs.is_empty() {
        return finish(prepared, None).await;
    }

    let backend = BrowserBackend::from_config(&prepared.config);
    let pool = Arc::clone(backend.pool());
    let bulk = bulk_fetcher(&prepared.config, backend)?.with_progress(progress);

    let jobs = std::mem::take(&mut prepared.jobs);
    let result = bulk
        .fetch_all(jobs, &prepared.config.html_dir(), Some(prepared.config.base_url()))
        .await;
    pool.shutdown().await;

    finish(prepared, Some(result?.statuses)).await
}
