//! Atomic file persistence
//!
//! Every artifact is written with the write-to-temp-then-rename pattern: the
//! bytes go to a sibling `*.tmp` file, are synced to disk, and only then is
//! the temp file renamed over the destination. A reader sees either the
//! previous version or the new one, never a truncated file.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Sibling temp path: `listings.json` -> `listings.json.tmp`.
#[must_use]
pub fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("artifact"));
    name.push(".tmp");
    path.with_file_name(name)
}

/// Bytes that have been written and synced to the temp path but not yet
/// published. Dropping it without [`StagedWrite::commit`] leaves the
/// destination untouched.
#[derive(Debug)]
pub struct StagedWrite {
    temp_path: PathBuf,
    final_path: PathBuf,
}

impl StagedWrite {
    #[must_use]
    pub fn temp_path(&self) -> &Path {
        &self.temp_path
    }

    /// Atomic rename (overwrites existing file)
    pub async fn commit(self) -> Result<()> {
        fs::rename(&self.temp_path, &self.final_path)
            .await
            .with_context(|| {
                format!(
                    "Failed to rename {} to {}",
                    self.temp_path.display(),
                    self.final_path.display()
                )
            })
    }
}

/// First half of an atomic write: create parent dirs, write and sync the temp file.
pub async fn stage_bytes(path: &Path, bytes: &[u8]) -> Result<StagedWrite> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory {}", parent.display()))?;
    }

    let temp_path = temp_path_for(path);
    let mut file = fs::File::create(&temp_path)
        .await
        .with_context(|| format!("Failed to create temp file {}", temp_path.display()))?;

    file.write_all(bytes)
        .await
        .with_context(|| format!("Failed to write {}", temp_path.display()))?;

    // Sync to disk before rename
    file.sync_all()
        .await
        .with_context(|| format!("Failed to sync {}", temp_path.display()))?;

    Ok(StagedWrite {
        temp_path,
        final_path: path.to_path_buf(),
    })
}

pub async fn write_bytes_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    stage_bytes(path, bytes).await?.commit().await
}

/// Serialize `value` as pretty JSON and publish it atomically at `path`.
pub async fn write_json_atomic<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    write_bytes_atomic(path, json.as_bytes()).await
}

pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let contents = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse JSON in {}", path.display()))
}

/// `Ok(None)` when the file does not exist.
pub async fn read_json_if_exists<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !fs::try_exists(path).await.unwrap_or(false) {
        return Ok(None);
    }
    read_json(path).await.map(Some)
}

/// Remove a file, treating "already gone" as success. Returns whether a file was removed.
pub async fn remove_if_exists(path: &Path) -> Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn write_then_read_json() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("nested").join("doc.json");
        write_json_atomic(&path, &vec!["a", "b"]).await.expect("write");
        let back: Vec<String> = read_json(&path).await.expect("read");
        assert_eq!(back, vec!["a", "b"]);
        assert!(!temp_path_for(&path).exists());
    }

    #[tokio::test]
    async fn staged_write_without_commit_keeps_previous_version() {
        let dir = TempDir::new().expect("tempdir");
        let path = dir.path().join("listings.json");
        write_json_atomic(&path, &serde_json::json!({"old": 1}))
            .await
            .expect("first write");

        let staged = stage_bytes(&path, b"{\"new\": 2, \"trunc")
            .await
            .expect("stage");
        let temp = staged.temp_path().to_path_buf();
        drop(staged);

        assert!(temp.exists());
        let current: serde_json::Value = read_json(&path).await.expect("old version readable");
        assert_eq!(current, serde_json::json!({"old": 1}));
    }

    #[tokio::test]
    async fn remove_missing_file_is_ok() {
        let dir = TempDir::new().expect("tempdir");
        assert!(!remove_if_exists(&dir.path().join("nope.json")).await.expect("remove"));
    }

    #[test]
    fn temp_path_appends_suffix() {
        assert_eq!(
            temp_path_for(Path::new("/d/html/abc.html")),
            PathBuf::from("/d/html/abc.html.tmp")
        );
    }
}
