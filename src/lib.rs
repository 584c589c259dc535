//! mfbridge
//!
//! Webcam discovery, device event monitoring and frame conversion on top of a
//! native capture engine.
//!
//! ## Crates
//!
//! - [`native`]: bootstrap of the native engine and its C ABI
//! - [`capture`]: device registry, event monitor, lifecycle controller
//! - [`frame`]: raw sample to RGB image conversion

mod logging;

pub use logging::{LoggingConfig, init_logging};
pub use mfbridge_capture as capture;
pub use mfbridge_frame as frame;
pub use mfbridge_native as native;

pub use mfbridge_capture::{
    CaptureConfig, CaptureController, CaptureError, Device, ImageSink, LogSink, MonitorState, Sink,
    diagnostics,
};
pub use mfbridge_frame::{DecodedImage, PixelFormat, RawFrame, StreamProcessor};
pub use mfbridge_native::{BackendStatus, Bootstrap, NativeSource};
