//! The browser's download directory.
//!
//! The browser gives no handle on a finished download, so the actor lists the
//! directory before clicking "download" and looks for a new file afterwards.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::debug;

use rxbatch_contracts::error::{RxError, RxResult};

/// Suffixes browsers use for downloads still in progress.
const PARTIAL_SUFFIXES: &[&str] = &["crdownload", "part", "tmp"];

/// An existing, absolute download directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDir {
    path: PathBuf,
}

/// The files present in a `DownloadDir` at one point in time.
#[derive(Debug, Clone, Default)]
pub struct Snapshot(HashSet<PathBuf>);

impl DownloadDir {
    /// Create `path` (and its parents) if needed and resolve it to an
    /// absolute path; browsers reject relative download directories.
    pub fn prepare(path: &Path) -> RxResult<Self> {
        let failed = |e: std::io::Error| RxError::ConfigError {
            reason: format!("download directory '{}' is not usable: {}", path.display(), e),
        };

        fs::create_dir_all(path).map_err(failed)?;
        let path = path.canonicalize().map_err(failed)?;
        debug!(dir = %path.display(), "download directory ready");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// List the completed files currently in the directory.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot(self.completed_files().map(|(p, _)| p).collect())
    }

    /// The most recently modified completed file not in `before`.
    pub fn newest_since(&self, before: &Snapshot) -> Option<PathBuf> {
        self.completed_files()
            .filter(|(p, _)| !before.0.contains(p))
            .max_by_key(|(_, modified)| *modified)
            .map(|(p, _)| p)
    }

    fn completed_files(&self) -> impl Iterator<Item = (PathBuf, SystemTime)> {
        // An unreadable directory looks empty; the caller falls back to the
        // directory itself.
        fs::read_dir(&self.path)
            .into_iter()
            .flatten()
            .filter_map(Result::ok)
            .filter_map(|entry| {
                let meta = entry.metadata().ok()?;
                if !meta.is_file() {
                    return None;
                }
                let path = entry.path();
                let partial = path
                    .extension()
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| PARTIAL_SUFFIXES.contains(&e));
                if partial {
                    return None;
                }
                Some((path, meta.modified().unwrap_or(SystemTime::UNIX_EPOCH)))
            })
    }
}
