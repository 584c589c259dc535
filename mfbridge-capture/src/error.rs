//! Error types for capture operations.

use thiserror::Error;

/// Errors returned synchronously to the caller.
///
/// These are contract violations or bad input. Environmental failures from
/// the native engine are reported through [`crate::Sink::on_error`] instead.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("Capture system not initialised")]
    NotInitialised,

    #[error("Device index {index} out of range ({len} devices)")]
    DeviceIndex { index: usize, len: usize },

    #[error("Native device list has {len} entries, expected a multiple of 3")]
    MalformedDeviceList { len: usize },

    #[error("Native device enumeration failed")]
    EnumerationFailed,

    #[error("Invalid configuration: {0}")]
    Config(#[from] serde_json::Error),
}

/// Codes passed to [`crate::Sink::on_error`] for failures raised by mfbridge
/// itself. Codes reported by the native engine are forwarded unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ErrorCode {
    UnsupportedPlatform = 1,
    BackendUnavailable = 2,
    InitialiseFailed = 3,
    MonitorFailed = 4,
    EnumerationFailed = 5,
    UninitialiseFailed = 6,
    DeviceActivationFailed = 7,
}

impl ErrorCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}
