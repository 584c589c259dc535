//! Lifecycle controller: the public face of mfbridge.

use crate::config::CaptureConfig;
use crate::device::Device;
use crate::error::{CaptureError, ErrorCode};
use crate::monitor::{EventMonitor, MonitorSlot, Readiness};
use crate::registry::DeviceRegistry;
use crate::sink::{LogSink, Sink};
use mfbridge_native::{BackendStatus, Bootstrap, NativeBackend, NativeRuntime};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, warn};

/// Where the controller is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MonitorState {
    Uninitialized,
    Initializing,
    Monitoring,
    ShuttingDown,
}

impl MonitorState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::Initializing,
            2 => Self::Monitoring,
            3 => Self::ShuttingDown,
            _ => Self::Uninitialized,
        }
    }
}

/// Coordinates bootstrap status, device registry and event monitor.
///
/// `initialize` and `uninitialise` report environmental failures through the
/// sink and return `bool`; device lookups return `Result`.
///
/// Lookups and [`CaptureController::state`] never wait on a lifecycle
/// transition, so a sink may call back into the controller from the monitor
/// thread.
pub struct CaptureController {
    status: BackendStatus,
    backend: Option<Arc<dyn NativeBackend>>,
    config: CaptureConfig,
    registry: DeviceRegistry,
    state: AtomicU8,
    /// Serialises `initialize`/`uninitialise` and owns the running monitor.
    /// Only those two take it.
    transition: Mutex<Option<EventMonitor>>,
    /// Sink for the next `initialize`.
    sink: Mutex<Option<Arc<dyn Sink>>>,
    /// Sink the running monitor was started with.
    active_sink: Mutex<Option<Arc<dyn Sink>>>,
}

static GLOBAL: OnceLock<CaptureController> = OnceLock::new();

impl CaptureController {
    /// The process-wide controller over the bootstrapped native backend.
    pub fn global() -> &'static CaptureController {
        GLOBAL.get_or_init(|| Self::new(Bootstrap::global()))
    }

    /// Controller over an explicitly loaded runtime.
    ///
    /// Only one controller at a time can monitor a given backend; a second
    /// one fails `initialize` with [`ErrorCode::MonitorFailed`].
    pub fn new(runtime: &NativeRuntime) -> Self {
        Self::with_backend(
            runtime.status().clone(),
            runtime.backend(),
            CaptureConfig::default(),
        )
    }

    pub fn with_backend(
        status: BackendStatus,
        backend: Option<Arc<dyn NativeBackend>>,
        config: CaptureConfig,
    ) -> Self {
        Self {
            status,
            backend,
            config,
            registry: DeviceRegistry::new(),
            state: AtomicU8::new(MonitorState::Uninitialized as u8),
            transition: Mutex::new(None),
            sink: Mutex::new(None),
            active_sink: Mutex::new(None),
        }
    }

    pub fn with_config(mut self, config: CaptureConfig) -> Self {
        self.config = config;
        self
    }

    /// Sink for the next `initialize`. A running monitor keeps its sink.
    pub fn set_sink(&self, sink: Arc<dyn Sink>) {
        *self.sink.lock() = Some(sink);
        if self.state() == MonitorState::Monitoring {
            debug!("Sink replaced; takes effect on next initialise");
        }
    }

    fn sink_or_default(&self) -> Arc<dyn Sink> {
        self.sink
            .lock()
            .get_or_insert_with(|| Arc::new(LogSink) as Arc<dyn Sink>)
            .clone()
    }

    /// The sink native events currently go to, falling back to the pending one.
    fn event_sink(&self) -> Arc<dyn Sink> {
        let active = self.active_sink.lock().clone();
        active.unwrap_or_else(|| self.sink_or_default())
    }

    fn set_state(&self, state: MonitorState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Start the native engine and the event monitor, then enumerate devices.
    ///
    /// Already monitoring: only re-enumerates. Returns `false` on a 32-bit
    /// host, an unusable backend, a monitor still running on the backend, or
    /// a failed native start.
    pub fn initialize(&self) -> bool {
        let sink = self.sink_or_default();
        let mut running = self.transition.lock();

        if !self.status.is_64bit() {
            warn!("mfbridge requires a 64-bit system");
            sink.on_error(
                ErrorCode::UnsupportedPlatform.code(),
                "mfbridge requires a 64-bit system",
            );
            return false;
        }

        let backend = match &self.backend {
            Some(backend) if self.status.is_usable() => backend.clone(),
            _ => {
                let reason = self.status.last_error().unwrap_or("native backend not loaded");
                sink.on_error(ErrorCode::BackendUnavailable.code(), reason);
                return false;
            }
        };

        if self.state() != MonitorState::Monitoring {
            let Some(slot) = MonitorSlot::claim(backend.as_ref()) else {
                warn!("An event monitor is still running on this backend");
                sink.on_error(
                    ErrorCode::MonitorFailed.code(),
                    "An event monitor is still running on this backend",
                );
                return false;
            };

            self.set_state(MonitorState::Initializing);
            info!("Initialising native capture engine");

            if !backend.initialise() {
                self.set_state(MonitorState::Uninitialized);
                sink.on_error(
                    ErrorCode::InitialiseFailed.code(),
                    "Native initialise reported failure",
                );
                return false;
            }

            let monitor = match EventMonitor::spawn(backend.clone(), sink.clone(), slot, &self.config) {
                Ok(monitor) => monitor,
                Err(e) => {
                    backend.uninitialise();
                    self.set_state(MonitorState::Uninitialized);
                    sink.on_error(
                        ErrorCode::MonitorFailed.code(),
                        &format!("Failed to start event monitor: {e}"),
                    );
                    return false;
                }
            };

            match monitor.wait_ready(self.config.ready_timeout) {
                Readiness::Ready => debug!("Native layer ready"),
                Readiness::TimedOut => warn!(
                    "Native layer not ready after {:?}; enumerating anyway",
                    self.config.ready_timeout
                ),
                Readiness::WorkerExited => warn!("Event monitor exited before signalling readiness"),
            }

            *running = Some(monitor);
            *self.active_sink.lock() = Some(sink.clone());
            self.set_state(MonitorState::Monitoring);
            info!("Capture engine monitoring");
        }

        if let Err(e) = self.registry.enumerate(backend.as_ref()) {
            sink.on_error(ErrorCode::EnumerationFailed.code(), &e.to_string());
        }

        true
    }

    /// Stop the native engine and wait (bounded) for the monitor to exit.
    ///
    /// Idempotent: when not monitoring, returns `true` without native calls.
    /// A monitor that outlives `shutdown_timeout` is detached and keeps the
    /// backend claimed until it returns.
    pub fn uninitialise(&self) -> bool {
        let mut running = self.transition.lock();
        if self.state() != MonitorState::Monitoring {
            return true;
        }

        self.set_state(MonitorState::ShuttingDown);
        info!("Shutting down capture engine");

        let monitor = running.take();
        let sink = self
            .active_sink
            .lock()
            .take()
            .unwrap_or_else(|| Arc::new(LogSink) as Arc<dyn Sink>);

        if let Some(monitor) = &monitor {
            monitor.request_stop();
        }

        let ok = match &self.backend {
            Some(backend) => backend.uninitialise(),
            None => true,
        };
        if !ok {
            sink.on_error(
                ErrorCode::UninitialiseFailed.code(),
                "Native uninitialise reported failure",
            );
        }

        if let Some(monitor) = monitor {
            monitor.join(self.config.shutdown_timeout);
        }

        self.registry.clear();
        self.set_state(MonitorState::Uninitialized);
        ok
    }

    pub fn state(&self) -> MonitorState {
        MonitorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn is_initialised(&self) -> bool {
        self.state() == MonitorState::Monitoring
    }

    pub fn status(&self) -> &BackendStatus {
        &self.status
    }

    /// Re-enumerate devices, e.g. after `on_new_device`/`on_lost_device`.
    pub fn refresh_devices(&self) -> Result<Vec<Device>, CaptureError> {
        let backend = self.running_backend()?;
        Ok(self.registry.enumerate(backend.as_ref())?.to_vec())
    }

    /// Devices from the most recent enumeration.
    pub fn devices(&self) -> Vec<Device> {
        self.registry.snapshot().to_vec()
    }

    pub fn device_by_id(&self, id: usize) -> Result<Device, CaptureError> {
        self.running_backend()?;
        self.registry.get(id)
    }

    /// Ids of active devices, ascending.
    pub fn active_device_indices(&self) -> Vec<usize> {
        self.registry.active_indices()
    }

    /// Start streaming from device `id`. `Ok(false)` if the engine refused.
    pub fn activate_device(&self, id: usize) -> Result<bool, CaptureError> {
        self.set_device_active(id, true)
    }

    /// Stop streaming from device `id`. `Ok(false)` if the engine refused.
    pub fn deactivate_device(&self, id: usize) -> Result<bool, CaptureError> {
        self.set_device_active(id, false)
    }

    fn set_device_active(&self, id: usize, active: bool) -> Result<bool, CaptureError> {
        let backend = self.running_backend()?;
        let device = self.registry.get(id)?;

        let ok = if active {
            backend.activate_device(&device.symbolic_link)
        } else {
            backend.deactivate_device(&device.symbolic_link)
        };

        if !ok {
            let verb = if active { "activate" } else { "deactivate" };
            self.event_sink().on_error(
                ErrorCode::DeviceActivationFailed.code(),
                &format!("Failed to {verb} {}", device.friendly_name),
            );
            return Ok(false);
        }

        self.registry.set_active(id, active)?;
        info!("Device {} ({}) active={}", id, device.friendly_name, active);
        Ok(true)
    }

    fn running_backend(&self) -> Result<Arc<dyn NativeBackend>, CaptureError> {
        if !self.is_initialised() {
            return Err(CaptureError::NotInitialised);
        }
        self.backend.clone().ok_or(CaptureError::NotInitialised)
    }
}

impl Drop for CaptureController {
    fn drop(&mut self) {
        self.uninitialise();
    }
}
