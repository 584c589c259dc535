//! Process-wide native backend status.

use crate::error::BootstrapError;

/// Outcome of bootstrapping the native backend.
///
/// Written once during bootstrap and read-only afterwards. Components consult
/// [`BackendStatus::is_usable`] before touching the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendStatus {
    loaded: bool,
    accessible: bool,
    last_error: Option<String>,
    is_64bit: bool,
}

impl BackendStatus {
    /// Library resolved and linked.
    pub fn loaded() -> Self {
        Self {
            loaded: true,
            accessible: true,
            last_error: None,
            is_64bit: true,
        }
    }

    /// Load attempted on a 64-bit host and failed.
    pub fn failed(error: &BootstrapError) -> Self {
        Self {
            loaded: false,
            accessible: !error.is_access_denied(),
            last_error: Some(error.to_string()),
            is_64bit: true,
        }
    }

    /// 32-bit host; bootstrap skipped.
    pub fn unsupported_platform() -> Self {
        Self {
            loaded: false,
            accessible: false,
            last_error: Some(BootstrapError::UnsupportedPlatform.to_string()),
            is_64bit: false,
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn is_accessible(&self) -> bool {
        self.accessible
    }

    pub fn is_64bit(&self) -> bool {
        self.is_64bit
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// `loaded && accessible`.
    pub fn is_usable(&self) -> bool {
        self.loaded && self.accessible
    }
}
