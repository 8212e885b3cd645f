//! Per-unit checkpoint files.
//!
//! A unit's checkpoint is `{stem}.{unit}.partial.json` next to the final
//! artifact and holds the records that unit collected. It is written once,
//! when the unit's pagination ends, and deleted after a successful merge.

use anyhow::{Context, Result};
use log::debug;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::atomic::{read_json, remove_if_exists, write_json_atomic};
use crate::models::RecordSet;

const PARTIAL_SUFFIX: &str = ".partial.json";

/// A checkpoint file found on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointEntry {
    pub unit: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone)]
pub struct CheckpointStore {
    dir: PathBuf,
    stem: String,
}

impl CheckpointStore {
    /// Checkpoints for the artifact at `artifact_path` (`dir/listings.json`
    /// yields `dir/listings.{unit}.partial.json`).
    #[must_use]
    pub fn for_artifact(artifact_path: &Path) -> Self {
        let dir = artifact_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        let stem = artifact_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "listings".to_string());
        Self { dir, stem }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn prefix(&self) -> String {
        format!("{}.", self.stem)
    }

    #[must_use]
    pub fn path_for(&self, unit: &str) -> PathBuf {
        let safe = sanitize_filename::sanitize(unit);
        self.dir
            .join(format!("{}{safe}{PARTIAL_SUFFIX}", self.prefix()))
    }

    pub async fn has(&self, unit: &str) -> bool {
        fs::try_exists(self.path_for(unit)).await.unwrap_or(false)
    }

    pub async fn save(&self, unit: &str, records: &RecordSet) -> Result<PathBuf> {
        let path = self.path_for(unit);
        write_json_atomic(&path, records)
            .await
            .with_context(|| format!("Failed to checkpoint unit '{unit}'"))?;
        debug!("Checkpointed {} records for {unit} to {}", records.len(), path.display());
        Ok(path)
    }

    pub async fn load(&self, path: &Path) -> Result<RecordSet> {
        read_json(path).await
    }

    /// Every checkpoint in the directory, sorted by unit identifier.
    pub async fn list_all(&self) -> Result<Vec<CheckpointEntry>> {
        let mut entries = Vec::new();
        let mut dir = match fs::read_dir(&self.dir).await {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(entries),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to scan {}", self.dir.display()));
            }
        };

        let prefix = self.prefix();
        while let Some(entry) = dir.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            let Some(unit) = name
                .strip_prefix(prefix.as_str())
                .and_then(|rest| rest.strip_suffix(PARTIAL_SUFFIX))
            else {
                continue;
            };
            if unit.is_empty() {
                continue;
            }
            entries.push(CheckpointEntry {
                unit: unit.to_string(),
                path: entry.path(),
            });
        }

        entries.sort_by(|a, b| a.unit.cmp(&b.unit));
        Ok(entries)
    }

    /// Delete every checkpoint. Returns how many were removed.
    pub async fn delete_all(&self) -> Result<usize> {
        let mut removed = 0;
        for entry in self.list_all().await? {
            if remove_if_exists(&entry.path).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AttorneyRecord;
    use tempfile::TempDir;

    #[tokio::test]
    async fn save_list_and_delete() {
        let dir = TempDir::new().expect("tempdir");
        let store = CheckpointStore::for_artifact(&dir.path().join("listings.json"));

        let mut records = RecordSet::new();
        records.insert_if_absent("u1", AttorneyRecord::with_identity("u1", ""));
        store.save("tax-law", &records).await.expect("save");
        store.save("bankruptcy", &RecordSet::new()).await.expect("save");
        fs::write(dir.path().join("listings.json"), "{}").await.expect("unrelated");

        let all = store.list_all().await.expect("list");
        let units: Vec<_> = all.iter().map(|e| e.unit.as_str()).collect();
        assert_eq!(units, vec!["bankruptcy", "tax-law"]);
        assert!(store.has("tax-law").await);

        let loaded = store.load(&all[1].path).await.expect("load");
        assert!(loaded.contains("u1"));

        assert_eq!(store.delete_all().await.expect("delete"), 2);
        assert!(dir.path().join("listings.json").exists());
    }

    #[test]
    fn path_is_next_to_artifact() {
        let store = CheckpointStore::for_artifact(Path::new("/d/listings.json"));
        assert_eq!(
            store.path_for("family-law"),
            PathBuf::from("/d/listings.family-law.partial.json")
        );
    }
}
