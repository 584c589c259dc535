//! Capture device records.

use serde::{Deserialize, Serialize};

/// One discoverable capture device.
///
/// `id` is the device's position in the enumeration that produced it and is
/// only meaningful until the next enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: usize,
    pub friendly_name: String,
    /// Native device path.
    pub symbolic_link: String,
    pub parent_id: String,
    pub active: bool,
}

impl Device {
    pub fn new(id: usize, friendly_name: String, symbolic_link: String, parent_id: String) -> Self {
        Self {
            id,
            friendly_name,
            symbolic_link,
            parent_id,
            active: false,
        }
    }
}
