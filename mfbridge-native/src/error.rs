//! Bootstrap error types.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while making the native backend available.
///
/// These never escape [`crate::Bootstrap::load`]; they are recorded into the
/// [`crate::BackendStatus`] instead.
#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("mfbridge requires a 64-bit process")]
    UnsupportedPlatform,

    #[error("No native binary configured")]
    NoBinary,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Failed to write native binary to {path}: {source}")]
    Extraction {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to load native library: {0}")]
    Link(#[from] libloading::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl BootstrapError {
    /// Whether the failure was an access-control refusal rather than a broken binary.
    pub fn is_access_denied(&self) -> bool {
        match self {
            Self::AccessDenied(_) => true,
            Self::Extraction { source, .. } | Self::Io(source) => {
                source.kind() == io::ErrorKind::PermissionDenied
            }
            _ => false,
        }
    }
}
