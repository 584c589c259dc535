//! mfbridge Native - Native capture engine bootstrap
//!
//! Makes the native capture engine available to the process exactly once and
//! describes the contract the rest of mfbridge relies on:
//!
//! - [`Bootstrap`]: extract and load the shared library, record the outcome
//! - [`BackendStatus`]: immutable record of that outcome
//! - [`NativeBackend`]: enumerate / initialise / monitor / uninitialise
//! - [`EventReceiver`]: what the engine calls back into while monitoring
//!
//! ## Example
//!
//! ```ignore
//! use mfbridge_native::{Bootstrap, NativeSource};
//!
//! Bootstrap::install(NativeSource::Embedded(include_bytes!("../native/mfbridge.dll")));
//! let runtime = Bootstrap::global();
//! if !runtime.status().is_usable() {
//!     eprintln!("{:?}", runtime.status().last_error());
//! }
//! ```

mod backend;
mod bootstrap;
mod error;
mod ffi;
mod receiver;
mod status;
mod temp_dir;

pub use backend::NativeBackend;
pub use bootstrap::{
    Bootstrap, BootstrapConfig, NATIVE_LIB_ENV, NativeRuntime, NativeSource, TEMP_PREFIX, diagnostics,
};
pub use error::BootstrapError;
pub use ffi::{MfbReceiver, NativeLibrary};
pub use receiver::{EventReceiver, NativeEvent};
pub use status::BackendStatus;
pub use temp_dir::{TempDir, remove_stale};
