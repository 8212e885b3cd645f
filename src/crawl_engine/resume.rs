//! Decides which units a listing crawl still has to run.
//!
//! Completion is binary per unit: a unit with a checkpoint on disk (or listed
//! in the single-worker progress manifest) is skipped, anything else is
//! crawled again from page 1. `force` removes every trace of previous runs
//! before the plan is made.

use anyhow::Result;
use log::{info, warn};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::crawl_types::WorkUnit;
use crate::models::{ProgressManifest, RecordSet};
use crate::store::{CheckpointStore, read_json, read_json_if_exists, remove_if_exists};

#[derive(Debug)]
pub enum ResumePlan {
    /// The output artifact exists and nothing is pending. Nothing is fetched.
    AlreadyComplete { records: usize },
    Pending(PendingWork),
}

#[derive(Debug, Default)]
pub struct PendingWork {
    pub remaining: Vec<WorkUnit>,
    /// Unit ids skipped because they are already complete
    pub skipped: Vec<String>,
    /// Records of a previous single-worker run; fills merge gaps only
    pub seed: Option<RecordSet>,
    pub manifest: Option<ProgressManifest>,
}

#[derive(Debug, Clone)]
pub struct ResumeController {
    checkpoints: CheckpointStore,
    output_path: PathBuf,
    manifest_path: PathBuf,
}

impl ResumeController {
    #[must_use]
    pub fn new(output_path: impl Into<PathBuf>, manifest_path: impl Into<PathBuf>) -> Self {
        let output_path = output_path.into();
        Self {
            checkpoints: CheckpointStore::for_artifact(&output_path),
            output_path,
            manifest_path: manifest_path.into(),
        }
    }

    #[must_use]
    pub fn checkpoints(&self) -> &CheckpointStore {
        &self.checkpoints
    }

    #[must_use]
    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    #[must_use]
    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    /// Delete unit checkpoints, the progress manifest and the output artifact.
    pub async fn clear(&self) -> Result<()> {
        let removed = self.checkpoints.delete_all().await?;
        let manifest = remove_if_exists(&self.manifest_path).await?;
        let output = remove_if_exists(&self.output_path).await?;
        info!(
            "Fresh start: removed {removed} checkpoints{}{}",
            if manifest { ", progress manifest" } else { "" },
            if output { ", previous output" } else { "" },
        );
        Ok(())
    }

    pub async fn plan(&self, units: &[WorkUnit], force: bool) -> Result<ResumePlan> {
        if force {
            self.clear().await?;
            info!("Resume: 0 units skipped, {} remaining", units.len());
            return Ok(ResumePlan::Pending(PendingWork {
                remaining: units.to_vec(),
                ..PendingWork::default()
            }));
        }

        let checkpointed = self.checkpoints.list_all().await?;
        let manifest: Option<ProgressManifest> = match read_json_if_exists(&self.manifest_path).await
        {
            Ok(manifest) => manifest,
            Err(e) => {
                warn!("Ignoring unreadable progress manifest: {e:#}");
                None
            }
        };

        if checkpointed.is_empty() && manifest.is_none() && self.output_path.exists() {
            match read_json::<RecordSet>(&self.output_path).await {
                Ok(existing) => {
                    info!(
                        "{} already complete with {} records (use --force to re-crawl)",
                        self.output_path.display(),
                        existing.len()
                    );
                    return Ok(ResumePlan::AlreadyComplete {
                        records: existing.len(),
                    });
                }
                Err(e) => warn!("Existing output is unreadable, crawling again: {e:#}"),
            }
        }

        let mut done: HashSet<&str> = checkpointed.iter().map(|c| c.unit.as_str()).collect();
        if let Some(manifest) = &manifest {
            done.extend(manifest.completed_units.iter().map(String::as_str));
        }

        let (skipped, remaining): (Vec<&WorkUnit>, Vec<&WorkUnit>) =
            units.iter().partition(|u| done.contains(u.id.as_str()));

        let seed = if manifest.is_some() {
            match read_json_if_exists::<RecordSet>(&self.output_path).await {
                Ok(seed) => seed,
                Err(e) => {
                    warn!("Ignoring unreadable partial output: {e:#}");
                    None
                }
            }
        } else {
            None
        };

        info!(
            "Resume: {} units skipped, {} remaining",
            skipped.len(),
            remaining.len()
        );
        if let Some(seed) = &seed {
            info!("Loaded {} records from previous progress", seed.len());
        }

        Ok(ResumePlan::Pending(PendingWork {
            remaining: remaining.into_iter().cloned().collect(),
            skipped: skipped.into_iter().map(|u| u.id.clone()).collect(),
            seed,
            manifest,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttorneyRecord;
    use crate::store::write_json_atomic;
    use tempfile::TempDir;

    fn units(ids: &[&str]) -> Vec<WorkUnit> {
        ids.iter()
            .enumerate()
            .map(|(i, id)| WorkUnit::new(*id, i + 1))
            .collect()
    }

    fn one_record(id: &str) -> RecordSet {
        let mut set = RecordSet::new();
        set.insert_if_absent(id, AttorneyRecord::with_identity(id, format!("https://x/{id}.html")));
        set
    }

    #[tokio::test]
    async fn checkpointed_units_are_skipped() {
        let dir = TempDir::new().expect("tempdir");
        let ctl = ResumeController::new(dir.path().join("listings.json"), dir.path().join("crawl_progress.json"));
        ctl.checkpoints().save("a", &one_record("r1")).await.expect("save");

        let ResumePlan::Pending(work) = ctl.plan(&units(&["a", "b"]), false).await.expect("plan") else {
            panic!("expected pending work");
        };
        assert_eq!(work.skipped, vec!["a".to_string()]);
        assert_eq!(work.remaining, vec![WorkUnit::new("b", 2)]);
        assert!(work.seed.is_none());
    }

    #[tokio::test]
    async fn finished_output_is_already_complete() {
        let dir = TempDir::new().expect("tempdir");
        let output = dir.path().join("listings.json");
        write_json_atomic(&output, &one_record("r1")).await.expect("write");
        let ctl = ResumeController::new(&output, dir.path().join("crawl_progress.json"));

        let plan = ctl.plan(&units(&["a"]), false).await.expect("plan");
        assert!(matches!(plan, ResumePlan::AlreadyComplete { records: 1 }));
    }

    #[tokio::test]
    async fn manifest_seeds_from_partial_output() {
        let dir = TempDir::new().expect("tempdir");
        let output = dir.path().join("listings.json");
        let manifest_path = dir.path().join("crawl_progress.json");
        write_json_atomic(&output, &one_record("r1")).await.expect("write");
        let mut manifest = ProgressManifest::new(2, "2024-01-01T00:00:00Z");
        manifest.mark_completed("a");
        write_json_atomic(&manifest_path, &manifest).await.expect("write");

        let ctl = ResumeController::new(&output, &manifest_path);
        let ResumePlan::Pending(work) = ctl.plan(&units(&["a", "b"]), false).await.expect("plan") else {
            panic!("expected pending work");
        };
        assert_eq!(work.skipped, vec!["a".to_string()]);
        assert_eq!(work.seed.map(|s| s.len()), Some(1));
    }

    #[tokio::test]
    async fn force_removes_everything() {
        let dir = TempDir::new().expect("tempdir");
        let output = dir.path().join("listings.json");
        let manifest_path = dir.path().join("crawl_progress.json");
        write_json_atomic(&output, &one_record("r1")).await.expect("write");
        write_json_atomic(&manifest_path, &ProgressManifest::new(1, "t")).await.expect("write");
        let ctl = ResumeController::new(&output, &manifest_path);
        ctl.checkpoints().save("a", &one_record("r2")).await.expect("save");

        let ResumePlan::Pending(work) = ctl.plan(&units(&["a", "b"]), true).await.expect("plan") else {
            panic!("expected pending work");
        };
        assert_eq!(work.remaining.len(), 2);
        assert!(!output.exists());
        assert!(!manifest_path.exists());
        assert!(ctl.checkpoints().list_all().await.expect("list").is_empty());
    }
}
