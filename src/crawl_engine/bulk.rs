//! Two-phase bulk fetch of independent pages (attorney profiles).
//!
//! Phase one sweeps the whole batch over the fast path at a high
//! concurrency. Only the pages it could not get (challenged, or every
//! attempt failed) go to the slow path, in batches of at most `batch_size`
//! so the number of live browser pages stays bounded. Not-found pages are
//! final after the sweep.

use anyhow::{Context, Result};
use futures::StreamExt;
use futures::future::join_all;
use futures::stream;
use log::{info, warn};
use std::path::Path;
use std::sync::Arc;

use super::progress::{NoOpProgress, ProgressReporter};
use crate::fetch::{FetchGate, GateOutcome};
use crate::models::{FetchStatus, FetchStatusMap};
use crate::store::write_bytes_atomic;

/// One page to fetch; its body is saved as `{uuid}.html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileJob {
    pub uuid: String,
    pub url: String,
}

impl ProfileJob {
    #[must_use]
    pub fn new(uuid: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            url: url.into(),
        }
    }

    fn file_name(&self) -> String {
        format!("{}.html", sanitize_filename::sanitize(&self.uuid))
    }
}

/// Counts for one bulk run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkFetchReport {
    pub statuses: FetchStatusMap,
    pub sweep_successes: usize,
    pub escalated: usize,
    pub slow_successes: usize,
}

pub struct BulkFetcher {
    sweep: Option<FetchGate>,
    slow: FetchGate,
    sweep_concurrency: usize,
    batch_size: usize,
    progress: Arc<dyn ProgressReporter>,
}

impl BulkFetcher {
    /// `sweep = None` sends every job straight to the slow path.
    #[must_use]
    pub fn new(
        sweep: Option<FetchGate>,
        slow: FetchGate,
        sweep_concurrency: usize,
        batch_size: usize,
    ) -> Self {
        Self {
            sweep,
            slow,
            sweep_concurrency: sweep_concurrency.max(1),
            batch_size: batch_size.max(1),
            progress: Arc::new(NoOpProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ProgressReporter>) -> Self {
        self.progress = progress;
        self
    }

    /// Fetch every job into `html_dir`. Each job ends `success` or `failed`.
    pub async fn fetch_all(
        &self,
        jobs: Vec<ProfileJob>,
        html_dir: &Path,
        referer: Option<&str>,
    ) -> Result<BulkFetchReport> {
        tokio::fs::create_dir_all(html_dir)
            .await
            .with_context(|| format!("Failed to create {}", html_dir.display()))?;

        let mut report = BulkFetchReport::default();
        self.progress.report_fetch_planned(jobs.len());

        let blocked = match &self.sweep {
            Some(sweep) => {
                info!(
                    "Fast sweep over {} profiles ({} concurrent)",
                    jobs.len(),
                    self.sweep_concurrency
                );
                let mut results = stream::iter(jobs)
                    .map(|job| async move {
                        let outcome = sweep.fetch_outcome(&job.url, referer).await;
                        (job, outcome)
                    })
                    .buffer_unordered(self.sweep_concurrency);

                let mut blocked = Vec::new();
                while let Some((job, outcome)) = results.next().await {
                    match outcome {
                        GateOutcome::Body(body) => {
                            let status = self.save(&job, &body, html_dir).await;
                            if status == FetchStatus::Success {
                                report.sweep_successes += 1;
                            }
                            self.finish(&mut report, job.uuid, status);
                        }
                        GateOutcome::NotFound => {
                            self.finish(&mut report, job.uuid, FetchStatus::Failed);
                        }
                        GateOutcome::Challenged | GateOutcome::Exhausted(_) => blocked.push(job),
                    }
                }
                info!(
                    "Fast sweep: {} fetched, {} blocked",
                    report.sweep_successes,
                    blocked.len()
                );
                blocked
            }
            None => jobs,
        };

        report.escalated = blocked.len();
        if blocked.is_empty() {
            return Ok(report);
        }

        info!(
            "Browser fetch for {} profiles in batches of {}",
            blocked.len(),
            self.batch_size
        );
        for (batch_no, batch) in blocked.chunks(self.batch_size).enumerate() {
            let bodies = join_all(batch.iter().map(|job| self.slow.fetch(&job.url, referer))).await;
            for (job, body) in batch.iter().zip(bodies) {
                let status = match body {
                    Some(body) => self.save(job, &body, html_dir).await,
                    None => FetchStatus::Failed,
                };
                if status == FetchStatus::Success {
                    report.slow_successes += 1;
                }
                self.finish(&mut report, job.uuid.clone(), status);
            }
            info!(
                "Browser batch {}: {} of {} done",
                batch_no + 1,
                ((batch_no + 1) * self.batch_size).min(blocked.len()),
                blocked.len()
            );
        }

        Ok(report)
    }

    async fn save(&self, job: &ProfileJob, body: &str, html_dir: &Path) -> FetchStatus {
        let path = html_dir.join(job.file_name());
        match write_bytes_atomic(&path, body.as_bytes()).await {
            Ok(()) => FetchStatus::Success,
            Err(e) => {
                warn!("Failed to save profile {}: {e:#}", job.uuid);
                FetchStatus::Failed
            }
        }
    }

    fn finish(&self, report: &mut BulkFetchReport, uuid: String, status: FetchStatus) {
        self.progress.report_fetch_completed(&uuid, status);
        report.statuses.insert(uuid, status);
    }
}
