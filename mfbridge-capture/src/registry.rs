//! Device registry built from the native enumeration.

use crate::device::Device;
use crate::error::CaptureError;
use mfbridge_native::NativeBackend;
use parking_lot::RwLock;
use regex::Regex;
use std::sync::{Arc, LazyLock};
use tracing::{debug, error};

/// Strings per device in the native enumeration.
const FIELDS_PER_DEVICE: usize = 3;

static PARENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$(.*?)\$").expect("parent id pattern is valid"));

/// Text between the first pair of `$` markers, or `raw` unchanged.
pub fn extract_parent_id(raw: &str) -> String {
    PARENT_ID
        .captures(raw)
        .and_then(|captures| captures.get(1))
        .map_or_else(|| raw.to_string(), |m| m.as_str().to_string())
}

/// Turn flat `(name, link, parent)` triples into devices numbered `0..N`.
pub fn parse_devices(raw: &[String]) -> Result<Vec<Device>, CaptureError> {
    if raw.len() % FIELDS_PER_DEVICE != 0 {
        return Err(CaptureError::MalformedDeviceList { len: raw.len() });
    }

    Ok(raw
        .chunks_exact(FIELDS_PER_DEVICE)
        .enumerate()
        .map(|(id, fields)| {
            Device::new(
                id,
                fields[0].clone(),
                fields[1].clone(),
                extract_parent_id(&fields[2]),
            )
        })
        .collect())
}

/// The current device list.
///
/// The list is replaced, never edited in place: readers always see one whole
/// enumeration.
#[derive(Debug)]
pub struct DeviceRegistry {
    devices: RwLock<Arc<[Device]>>,
}

impl Default for DeviceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DeviceRegistry {
    pub fn new() -> Self {
        Self {
            devices: RwLock::new(Vec::<Device>::new().into()),
        }
    }

    /// Query the backend and replace the current list.
    ///
    /// A failed or malformed native result leaves the current list untouched.
    pub fn enumerate(&self, backend: &dyn NativeBackend) -> Result<Arc<[Device]>, CaptureError> {
        let Some(raw) = backend.list_devices() else {
            error!("Native device enumeration failed");
            return Err(CaptureError::EnumerationFailed);
        };
        let devices: Arc<[Device]> = match parse_devices(&raw) {
            Ok(devices) => devices.into(),
            Err(e) => {
                error!("Device enumeration rejected: {}", e);
                return Err(e);
            }
        };

        debug!("Enumerated {} devices", devices.len());
        *self.devices.write() = devices.clone();
        Ok(devices)
    }

    /// The current list. Cheap; shares the allocation.
    pub fn snapshot(&self) -> Arc<[Device]> {
        self.devices.read().clone()
    }

    pub fn len(&self) -> usize {
        self.devices.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, id: usize) -> Result<Device, CaptureError> {
        let devices = self.snapshot();
        devices.get(id).cloned().ok_or(CaptureError::DeviceIndex {
            index: id,
            len: devices.len(),
        })
    }

    /// Ids of active devices, ascending.
    pub fn active_indices(&self) -> Vec<usize> {
        self.snapshot()
            .iter()
            .filter(|device| device.active)
            .map(|device| device.id)
            .collect()
    }

    /// Copy-on-write update of one device's active flag.
    pub fn set_active(&self, id: usize, active: bool) -> Result<(), CaptureError> {
        let mut devices = self.devices.write();
        if id >= devices.len() {
            return Err(CaptureError::DeviceIndex {
                index: id,
                len: devices.len(),
            });
        }

        let mut updated = devices.to_vec();
        updated[id].active = active;
        *devices = updated.into();
        Ok(())
    }

    pub fn clear(&self) {
        *self.devices.write() = Vec::<Device>::new().into();
    }
}
