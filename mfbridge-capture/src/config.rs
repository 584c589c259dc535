//! Controller configuration.

use crate::error::CaptureError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default bound on the wait for the native layer to report readiness.
pub const DEFAULT_READY_TIMEOUT: Duration = Duration::from_millis(250);

/// Default bound on the wait for the monitor thread to exit.
pub const DEFAULT_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Timing and naming for the lifecycle controller.
///
/// Durations serialize as milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    #[serde(with = "millis")]
    pub ready_timeout: Duration,
    #[serde(with = "millis")]
    pub shutdown_timeout: Duration,
    pub monitor_thread_name: String,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            ready_timeout: DEFAULT_READY_TIMEOUT,
            shutdown_timeout: DEFAULT_SHUTDOWN_TIMEOUT,
            monitor_thread_name: "mfbridge-event-monitor".to_string(),
        }
    }
}

impl CaptureConfig {
    /// Parse from JSON; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self, CaptureError> {
        Ok(serde_json::from_str(json)?)
    }
}

mod millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
