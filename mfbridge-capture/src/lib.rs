//! mfbridge Capture - Device discovery and event monitoring
//!
//! Sits on top of the native capture engine loaded by `mfbridge-native`:
//!
//! - [`CaptureController`]: initialise / uninitialise lifecycle, device access
//! - [`DeviceRegistry`]: the current device list, replaced on each enumeration
//! - [`Sink`]: device attach/detach, error and frame notifications
//! - [`ImageSink`]: a sink that converts frames and keeps the latest image
//!
//! ## Example
//!
//! ```ignore
//! use mfbridge_capture::{CaptureController, LogSink};
//! use std::sync::Arc;
//!
//! let controller = CaptureController::global();
//! controller.set_sink(Arc::new(LogSink));
//! if controller.initialize() {
//!     for device in controller.devices() {
//!         println!("{}: {}", device.id, device.friendly_name);
//!     }
//! }
//! controller.uninitialise();
//! ```

mod config;
mod controller;
mod device;
mod error;
mod monitor;
mod registry;
mod sink;

#[cfg(test)]
mod testing;

pub use config::{CaptureConfig, DEFAULT_READY_TIMEOUT, DEFAULT_SHUTDOWN_TIMEOUT};
pub use controller::{CaptureController, MonitorState};
pub use device::Device;
pub use error::{CaptureError, ErrorCode};
pub use monitor::Readiness;
pub use registry::{DeviceRegistry, extract_parent_id, parse_devices};
pub use sink::{ImageSink, LogSink, Sink};

// Re-export diagnostics for convenience
pub use mfbridge_native::diagnostics;
