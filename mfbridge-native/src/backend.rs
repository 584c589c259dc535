//! The native capture engine contract.

use crate::receiver::EventReceiver;

/// Operations the native capture engine exposes.
///
/// Failures are reported as `false`; there is no structured error on this
/// boundary.
pub trait NativeBackend: Send + Sync {
    /// Flat `(friendly name, symbolic link, parent id)` triples, one per device.
    ///
    /// `None` if the engine reported failure; a partial listing is discarded.
    fn list_devices(&self) -> Option<Vec<String>>;

    /// Start the capture engine.
    fn initialise(&self) -> bool;

    /// Block delivering events to `receiver` until the engine is torn down.
    fn monitor(&self, receiver: &EventReceiver) -> bool;

    /// Stop the capture engine. Unblocks [`NativeBackend::monitor`].
    fn uninitialise(&self) -> bool;

    /// Start streaming from the device at `symbolic_link`.
    fn activate_device(&self, symbolic_link: &str) -> bool;

    /// Stop streaming from the device at `symbolic_link`.
    fn deactivate_device(&self, symbolic_link: &str) -> bool;
}
