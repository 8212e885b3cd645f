//! Per-browser Chrome profile directories.
//!
//! Each launched browser gets `{temp}/attorney_scrape_chrome_{uuid}` so
//! concurrent instances never contend for Chrome's `SingletonLock`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

pub const PROFILE_PREFIX: &str = "attorney_scrape_chrome";

/// A profile directory that is deleted on drop unless
/// [`into_path`](Self::into_path) hands it to a running browser.
#[derive(Debug)]
pub struct BrowserProfile {
    path: PathBuf,
    owned: bool,
}

impl BrowserProfile {
    /// Create a new, empty profile directory under the system temp dir.
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// `create_dir`, not `create_dir_all`: a name collision is an error.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let path = parent.join(format!("{PROFILE_PREFIX}_{}", Uuid::new_v4()));
        std::fs::create_dir(&path)
            .with_context(|| format!("Failed to create profile directory {}", path.display()))?;
        debug!("Created browser profile {}", path.display());
        Ok(Self { path, owned: true })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn into_path(mut self) -> PathBuf {
        self.owned = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for BrowserProfile {
    fn drop(&mut self) {
        if self.owned
            && self.path.exists()
            && let Err(e) = std::fs::remove_dir_all(&self.path)
        {
            warn!("Failed to remove profile {}: {e}", self.path.display());
        }
    }
}

/// Whether the Chrome that owned `profile_dir` is gone.
///
/// `SingletonLock` is a symlink to `{hostname}-{pid}`. Without `/proc` the
/// pid cannot be checked and the lock counts as live.
#[must_use]
pub fn is_singleton_lock_stale(profile_dir: &Path) -> bool {
    let lock = profile_dir.join("SingletonLock");
    let Ok(target) = std::fs::read_link(&lock) else {
        // Missing, or a plain file left by a crash
        return !lock.is_symlink();
    };

    let proc_root = Path::new("/proc");
    let pid = target
        .to_string_lossy()
        .rsplit('-')
        .next()
        .and_then(|pid| pid.parse::<u32>().ok());
    match pid {
        Some(pid) if proc_root.is_dir() => !proc_root.join(pid.to_string()).exists(),
        _ => false,
    }
}

/// Delete profile directories in `parent` whose browser is no longer running.
pub fn cleanup_stale_profiles_in(parent: &Path) -> Result<usize> {
    let entries = std::fs::read_dir(parent)
        .with_context(|| format!("Failed to read {}", parent.display()))?;

    let stale = entries.flatten().map(|e| e.path()).filter(|path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(PROFILE_PREFIX))
            && path.is_dir()
            && is_singleton_lock_stale(path)
    });

    let mut removed = 0;
    for path in stale {
        match std::fs::remove_dir_all(&path) {
            Ok(()) => removed += 1,
            Err(e) => warn!("Failed to remove stale profile {}: {e}", path.display()),
        }
    }
    Ok(removed)
}

pub fn cleanup_stale_profiles() -> Result<usize> {
    cleanup_stale_profiles_in(&std::env::temp_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn profile_removed_on_drop_unless_taken() {
        let parent = TempDir::new().expect("tempdir");
        let profile = BrowserProfile::create_in(parent.path()).expect("profile");
        let path = profile.path().to_path_buf();
        assert!(path.exists());
        drop(profile);
        assert!(!path.exists());

        let kept = BrowserProfile::create_in(parent.path())
            .expect("profile")
            .into_path();
        assert!(kept.exists());
    }

    #[test]
    fn stale_profiles_are_swept() {
        let parent = TempDir::new().expect("tempdir");
        let stale = BrowserProfile::create_in(parent.path()).expect("profile").into_path();
        std::fs::create_dir(parent.path().join("unrelated")).expect("dir");

        assert_eq!(cleanup_stale_profiles_in(parent.path()).expect("cleanup"), 1);
        assert!(!stale.exists());
        assert!(parent.path().join("unrelated").exists());
    }
}
