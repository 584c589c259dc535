//! Temporary extraction directories for the native binary.
//!
//! A loaded shared library cannot be deleted on every platform while it is
//! mapped, so directories are never removed on exit. Instead, stale
//! directories left by earlier runs are swept before a new one is created.

use crate::error::BootstrapError;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// A uniquely named directory that outlives the process.
#[derive(Debug)]
pub struct TempDir {
    path: PathBuf,
}

impl TempDir {
    /// Create a directory under the system temp dir.
    pub fn create(prefix: &str) -> Result<Self, BootstrapError> {
        Self::create_in(&std::env::temp_dir(), prefix)
    }

    /// Sweep stale `prefix*` directories in `parent`, then create a new one.
    pub fn create_in(parent: &Path, prefix: &str) -> Result<Self, BootstrapError> {
        let removed = remove_stale(parent, prefix);
        if removed > 0 {
            debug!("Removed {} stale extraction directories", removed);
        }

        let path = tempfile::Builder::new()
            .prefix(prefix)
            .tempdir_in(parent)?
            .keep();

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Best-effort removal of every directory in `parent` named `prefix*`.
///
/// Returns how many were removed. Failures are swallowed: the directory may be
/// held by another running instance.
pub fn remove_stale(parent: &Path, prefix: &str) -> usize {
    let Ok(entries) = fs::read_dir(parent) else {
        return 0;
    };

    let mut removed = 0;
    for entry in entries.flatten() {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        let matches = entry.file_name().to_string_lossy().starts_with(prefix);
        if !is_dir || !matches {
            continue;
        }

        let path = entry.path();
        match fs::remove_dir_all(&path) {
            Ok(()) => removed += 1,
            Err(e) => debug!("Could not remove {}: {}", path.display(), e),
        }
    }
    removed
}
