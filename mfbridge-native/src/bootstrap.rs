//! One-time native backend bootstrap.

use crate::backend::NativeBackend;
use crate::error::BootstrapError;
use crate::ffi::NativeLibrary;
use crate::status::BackendStatus;
use crate::temp_dir::TempDir;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::{error, info};

/// Environment variable naming an already-present native library.
pub const NATIVE_LIB_ENV: &str = "MFBRIDGE_NATIVE_LIB";

/// Prefix of extraction directories under the temp dir.
pub const TEMP_PREFIX: &str = "mfbridge_tmp";

/// Where the native binary comes from.
#[derive(Debug, Clone)]
pub enum NativeSource {
    /// Library bytes embedded in the host binary; extracted before loading.
    Embedded(&'static [u8]),
    /// Library already on disk; loaded in place.
    Path(PathBuf),
}

/// Extraction settings.
#[derive(Debug, Clone)]
pub struct BootstrapConfig {
    pub temp_prefix: String,
    pub library_file_name: String,
    /// Parent of extraction directories; the system temp dir when `None`.
    pub temp_root: Option<PathBuf>,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            temp_prefix: TEMP_PREFIX.to_string(),
            library_file_name: format!(
                "{}mfbridge{}",
                std::env::consts::DLL_PREFIX,
                std::env::consts::DLL_SUFFIX
            ),
            temp_root: None,
        }
    }
}

/// Result of bootstrap: status plus the backend when loading succeeded.
pub struct NativeRuntime {
    status: BackendStatus,
    backend: Option<Arc<dyn NativeBackend>>,
}

impl NativeRuntime {
    fn failed(error: BootstrapError) -> Self {
        error!("Native backend unavailable: {}", error);
        Self {
            status: BackendStatus::failed(&error),
            backend: None,
        }
    }

    pub fn status(&self) -> &BackendStatus {
        &self.status
    }

    /// The loaded backend, `None` unless the status is usable.
    pub fn backend(&self) -> Option<Arc<dyn NativeBackend>> {
        self.backend.clone()
    }
}

impl std::fmt::Debug for NativeRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeRuntime")
            .field("status", &self.status)
            .field("backend", &self.backend.is_some())
            .finish()
    }
}

static SOURCE: OnceLock<NativeSource> = OnceLock::new();
static RUNTIME: OnceLock<NativeRuntime> = OnceLock::new();

/// Loads the native backend.
pub struct Bootstrap;

impl Bootstrap {
    /// Register the binary [`Bootstrap::global`] should load.
    ///
    /// Returns `false` if a source was already installed or bootstrap already ran.
    pub fn install(source: NativeSource) -> bool {
        RUNTIME.get().is_none() && SOURCE.set(source).is_ok()
    }

    /// The process-wide runtime, bootstrapped on first call.
    ///
    /// Uses the installed source, else [`NATIVE_LIB_ENV`]. A failed load is
    /// never retried.
    pub fn global() -> &'static NativeRuntime {
        RUNTIME.get_or_init(|| {
            let source = SOURCE.get().cloned().or_else(|| {
                std::env::var_os(NATIVE_LIB_ENV).map(|path| NativeSource::Path(PathBuf::from(path)))
            });
            Self::load(source, &BootstrapConfig::default())
        })
    }

    /// Bootstrap from `source`. Never fails; the outcome is in the status.
    pub fn load(source: Option<NativeSource>, config: &BootstrapConfig) -> NativeRuntime {
        if !cfg!(target_pointer_width = "64") {
            info!("32-bit process, native bootstrap skipped");
            return NativeRuntime {
                status: BackendStatus::unsupported_platform(),
                backend: None,
            };
        }

        let Some(source) = source else {
            return NativeRuntime::failed(BootstrapError::NoBinary);
        };

        let path = match source {
            NativeSource::Embedded(binary) => match Self::extract(binary, config) {
                Ok(path) => path,
                Err(e) => return NativeRuntime::failed(e),
            },
            NativeSource::Path(path) => path,
        };

        match NativeLibrary::open(&path) {
            Ok(library) => NativeRuntime {
                status: BackendStatus::loaded(),
                backend: Some(Arc::new(library)),
            },
            Err(e) => NativeRuntime::failed(e),
        }
    }

    /// Write `binary` into a fresh extraction directory and return its path.
    pub fn extract(binary: &[u8], config: &BootstrapConfig) -> Result<PathBuf, BootstrapError> {
        let parent = config.temp_root.clone().unwrap_or_else(std::env::temp_dir);
        let dir = TempDir::create_in(&parent, &config.temp_prefix)?;
        let destination = dir.path().join(&config.library_file_name);
        write_binary(&destination, binary)?;
        info!("Extracted native binary to {}", destination.display());
        Ok(destination)
    }
}

fn write_binary(destination: &Path, binary: &[u8]) -> Result<(), BootstrapError> {
    std::fs::write(destination, binary).map_err(|source| BootstrapError::Extraction {
        path: destination.to_path_buf(),
        source,
    })
}

/// Process-wide backend diagnostics.
pub mod diagnostics {
    use super::Bootstrap;

    pub fn is_backend_loaded() -> bool {
        Bootstrap::global().status().is_loaded()
    }

    pub fn is_backend_accessible() -> bool {
        Bootstrap::global().status().is_accessible()
    }

    pub fn is_os_64bit() -> bool {
        Bootstrap::global().status().is_64bit()
    }

    pub fn last_backend_error() -> Option<String> {
        Bootstrap::global().status().last_error().map(str::to_string)
    }
}
