//! Listing crawl orchestration
//!
//! Coordinates one crawl over many practice areas:
//! - Resume planning (skip units that already have a checkpoint)
//! - Up to `workers` unit crawls in flight, each in its own task
//! - One shared `GlobalCrawlState` for cross-unit dedup and the result cap
//! - Per-unit failure isolation
//! - Deterministic merge of all checkpoints into the final artifact

use anyhow::{Context, Result};
use chrono::Utc;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use log::{debug, error, info, warn};
use std::collections::{HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Semaphore;

use super::crawl_types::{CrawlError, CrawlSummary, WorkUnit};
use super::merge::merge_checkpoints;
use super::progress::{NoOpProgress, ProgressReporter};
use super::resume::{ResumeController, ResumePlan};
use super::state::GlobalCrawlState;
use super::unit_crawler::{CrawlContext, ListingSource, crawl_unit};
use crate::config::ScrapeConfig;
use crate::fetch::PageFetcher;
use crate::models::{ProgressManifest, RecordSet};
use crate::parsers::RecordParser;
use crate::store::{remove_if_exists, write_json_atomic};

/// One listing crawl: where to fetch, which units, where the result goes.
#[derive(Debug, Clone)]
pub struct CrawlJob {
    pub source: ListingSource,
    pub units: Vec<String>,
    pub output_path: PathBuf,
    pub manifest_path: PathBuf,
    /// Discard all previous progress before crawling
    pub force: bool,
}

pub struct CrawlOrchestrator {
    fetcher: Arc<dyn PageFetcher>,
    parser: Arc<dyn RecordParser>,
    progress: Arc<dyn ProgressReporter>,
    workers: usize,
    max_pages: u32,
    max_results: Option<usize>,
}

impl CrawlOrchestrator {
    #[must_use]
    pub fn new(
        config: &ScrapeConfig,
        fetcher: Arc<dyn PageFetcher>,
        parser: Arc<dyn RecordParser>,
    ) -> Self {
        Self {
            fetcher,
            parser,
            progress: Arc::new(NoOpProgress),
            workers: config.workers().max(1),
            max_pages: config.max_pages(),
            max_results: config.max_results(),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Single-worker runs keep the progress manifest and the accumulating
    /// output current after every unit.
    fn keeps_manifest(&self) -> bool {
        self.workers == 1
    }

    /// Crawl every pending unit of `job`, then merge.
    ///
    /// Only setup failures (output directory, resume planning, the final
    /// write) are returned as errors. A failing unit is logged, listed in the
    /// summary and retried by the next run.
    pub async fn run(&self, job: CrawlJob) -> Result<CrawlSummary> {
        if let Some(dir) = job.output_path.parent()
            && !dir.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| CrawlError::OutputDir {
                    path: dir.to_path_buf(),
                    reason: e.to_string(),
                })?;
        }

        let units = work_units(&job.units);
        let total = units.len();
        let controller = ResumeController::new(&job.output_path, &job.manifest_path);

        let pending = match controller.plan(&units, job.force).await? {
            ResumePlan::AlreadyComplete { records } => {
                return Ok(CrawlSummary {
                    total_units: total,
                    skipped_units: total,
                    records,
                    output_path: job.output_path,
                    already_complete: true,
                    ..CrawlSummary::default()
                });
            }
            ResumePlan::Pending(pending) => pending,
        };

        let state = Arc::new(GlobalCrawlState::new(self.max_results));
        if let Some(seed) = &pending.seed {
            state.register(seed.ids());
        }

        let mut manifest = pending
            .manifest
            .clone()
            .unwrap_or_else(|| ProgressManifest::new(total, Utc::now().to_rfc3339()));
        manifest.total_units = total;
        for unit in &pending.skipped {
            manifest.mark_completed(unit);
        }
        let mut accumulated = if self.keeps_manifest() {
            pending.seed.clone().unwrap_or_default()
        } else {
            RecordSet::new()
        };

        let ctx = Arc::new(CrawlContext {
            fetcher: Arc::clone(&self.fetcher),
            parser: Arc::clone(&self.parser),
            state: Arc::clone(&state),
            checkpoints: controller.checkpoints().clone(),
            source: job.source.clone(),
            max_pages: self.max_pages,
            total_units: total,
            progress: Arc::clone(&self.progress),
        });

        info!(
            "Crawling {} of {total} practice areas with {} worker(s)",
            pending.remaining.len(),
            self.workers
        );
        self.progress
            .report_crawl_planned(total, pending.skipped.len());

        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut queue: VecDeque<WorkUnit> = pending.remaining.into();
        let mut active_tasks = FuturesUnordered::new();
        let mut completed = 0;
        let mut failed: Vec<String> = Vec::new();

        loop {
            // Fill up to the worker limit
            while active_tasks.len() < self.workers {
                let Some(unit) = queue.pop_front() else {
                    break;
                };

                let Ok(permit) = Arc::clone(&semaphore).acquire_owned().await else {
                    error!("Worker semaphore closed unexpectedly");
                    failed.push(unit.id);
                    continue;
                };

                info!("[{}/{total}] {}", unit.position, unit.id);
                self.progress
                    .report_unit_started(&unit.id, unit.position, total);

                let ctx = Arc::clone(&ctx);
                let unit_id = unit.id.clone();
                let handle = tokio::spawn(async move {
                    let _permit = permit; // Hold until the unit is done
                    crawl_unit(&ctx, &unit).await
                });
                active_tasks.push(async move { (unit_id, handle.await) });
            }

            match active_tasks.next().await {
                Some((unit, Ok(Ok(outcome)))) => {
                    completed += 1;
                    info!(
                        "  [{unit}] {} records over {} pages ({})",
                        outcome.records.len(),
                        outcome.pages_fetched,
                        outcome.stop
                    );
                    if self.keeps_manifest() {
                        manifest.mark_completed(&unit);
                        accumulated.absorb(outcome.records);
                        self.persist_progress(&job, &manifest, &accumulated).await;
                    }
                }
                Some((unit, Ok(Err(e)))) => {
                    error!("{}", CrawlError::unit(&unit, &e));
                    failed.push(unit);
                }
                Some((unit, Err(join_err))) => {
                    error!("Unit '{unit}' task panicked: {join_err}");
                    failed.push(unit);
                }
                None => break,
            }
        }

        let report = merge_checkpoints(controller.checkpoints(), pending.seed, self.max_results)
            .await
            .context("Failed to merge unit checkpoints")?;
        write_json_atomic(&job.output_path, &report.records)
            .await
            .with_context(|| format!("Failed to write {}", job.output_path.display()))?;

        if failed.is_empty() {
            // Manifest before checkpoints: leftover checkpoints only re-merge,
            // a leftover manifest would send its unlisted units back to the crawl
            remove_if_exists(&job.manifest_path).await?;
            let removed = controller.checkpoints().delete_all().await?;
            debug!("Removed {removed} checkpoints after merge");
        } else {
            for unit in &report.units_read {
                manifest.mark_completed(unit);
            }
            write_json_atomic(&job.manifest_path, &manifest)
                .await
                .context("Failed to write progress manifest")?;
            warn!(
                "{} practice area(s) failed and will be retried on the next run: {}",
                failed.len(),
                failed.join(", ")
            );
        }

        let summary = CrawlSummary {
            total_units: total,
            skipped_units: pending.skipped.len(),
            completed_units: completed,
            failed_units: failed,
            records: report.records.len(),
            output_path: job.output_path,
            already_complete: false,
        };
        info!(
            "Crawl finished: {} unique records, {} completed, {} skipped, {} failed",
            summary.records,
            summary.completed_units,
            summary.skipped_units,
            summary.failed_units.len()
        );
        Ok(summary)
    }

    async fn persist_progress(
        &self,
        job: &CrawlJob,
        manifest: &ProgressManifest,
        accumulated: &RecordSet,
    ) {
        // Manifest first: a present manifest marks the output as partial
        if let Err(e) = write_json_atomic(&job.manifest_path, manifest).await {
            warn!("Failed to save progress manifest: {e:#}");
            return;
        }
        if let Err(e) = write_json_atomic(&job.output_path, accumulated).await {
            warn!("Failed to save partial output: {e:#}");
        }
    }
}

/// Unique unit ids in input order, numbered from 1.
fn work_units(ids: &[String]) -> Vec<WorkUnit> {
    let mut seen = HashSet::new();
    ids.iter()
        .filter(|id| seen.insert(id.as_str()))
        .enumerate()
        .map(|(i, id)| WorkUnit::new(id.clone(), i + 1))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn work_units_drop_duplicates() {
        let ids: Vec<String> = ["b", "a", "b"].iter().map(ToString::to_string).collect();
        let units = work_units(&ids);
        assert_eq!(units, vec![WorkUnit::new("b", 1), WorkUnit::new("a", 2)]);
    }
}
