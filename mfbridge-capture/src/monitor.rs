//! Background worker bridging the native notification channel to a [`Sink`].

use crate::config::CaptureConfig;
use crate::error::ErrorCode;
use crate::sink::Sink;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use mfbridge_native::{EventReceiver, NativeBackend, NativeEvent};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::{Arc, LazyLock};
use std::thread::JoinHandle;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How the wait for native readiness ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    Ready,
    TimedOut,
    /// The worker returned from `monitor` before signalling.
    WorkerExited,
}

/// Backends with a live monitor thread, keyed by address.
static MONITORED: LazyLock<Mutex<HashSet<usize>>> = LazyLock::new(|| Mutex::new(HashSet::new()));

/// Exclusive right to run a monitor thread against one backend.
///
/// Held by the worker until it returns from `monitor`, including a worker
/// that was detached after a shutdown timeout.
#[derive(Debug)]
pub(crate) struct MonitorSlot(usize);

impl MonitorSlot {
    /// `None` while another monitor thread is still running on `backend`.
    pub(crate) fn claim(backend: &dyn NativeBackend) -> Option<Self> {
        let key = std::ptr::from_ref(backend).cast::<()>() as usize;
        MONITORED.lock().insert(key).then_some(Self(key))
    }
}

impl Drop for MonitorSlot {
    fn drop(&mut self) {
        MONITORED.lock().remove(&self.0);
    }
}

/// Translate one native event into one sink call.
fn dispatch(sink: &dyn Sink, event: NativeEvent<'_>) {
    match event {
        NativeEvent::NewDevice => {
            debug!("Native event: device attached");
            sink.on_new_device();
        }
        NativeEvent::LostDevice(index) => {
            debug!("Native event: device {} lost", index);
            sink.on_lost_device(index);
        }
        NativeEvent::Error { code, message } => {
            warn!("Native error {}: {}", code, message);
            sink.on_error(code, message);
        }
        NativeEvent::Frame(frame) => sink.on_frame(&frame),
    }
}

/// Handle to the running monitor thread.
pub(crate) struct EventMonitor {
    handle: JoinHandle<()>,
    stop: Sender<()>,
    exited: Receiver<bool>,
    ready: Receiver<()>,
}

impl EventMonitor {
    /// Spawn the worker. It blocks in `backend.monitor` until native teardown
    /// and releases `slot` when it returns.
    pub(crate) fn spawn(
        backend: Arc<dyn NativeBackend>,
        sink: Arc<dyn Sink>,
        slot: MonitorSlot,
        config: &CaptureConfig,
    ) -> std::io::Result<Self> {
        let (ready_tx, ready_rx) = bounded(1);
        let (stop_tx, stop_rx) = bounded(1);
        let (exit_tx, exit_rx) = bounded(1);

        let handle = std::thread::Builder::new()
            .name(config.monitor_thread_name.clone())
            .spawn(move || {
                let _slot = slot;
                let events = sink.clone();
                let receiver = EventReceiver::new(
                    move |event| dispatch(events.as_ref(), event),
                    ready_tx,
                    stop_rx,
                );

                debug!("Event monitor running");
                let ok = backend.monitor(&receiver);
                if !ok {
                    sink.on_error(
                        ErrorCode::MonitorFailed.code(),
                        "Native monitor reported failure",
                    );
                }
                let _ = exit_tx.send(ok);
                debug!("Event monitor returned ({})", if ok { "ok" } else { "failed" });
            })?;

        Ok(Self {
            handle,
            stop: stop_tx,
            exited: exit_rx,
            ready: ready_rx,
        })
    }

    /// Wait up to `timeout` for the native layer to signal readiness.
    pub(crate) fn wait_ready(&self, timeout: Duration) -> Readiness {
        match self.ready.recv_timeout(timeout) {
            Ok(()) => Readiness::Ready,
            Err(RecvTimeoutError::Timeout) => Readiness::TimedOut,
            Err(RecvTimeoutError::Disconnected) => Readiness::WorkerExited,
        }
    }

    /// Ask the worker to stop. Backends honour this alongside native teardown.
    pub(crate) fn request_stop(&self) {
        let _ = self.stop.try_send(());
    }

    /// Wait up to `timeout` for the worker to return, then join it.
    ///
    /// Returns `false` if it did not exit in time; the thread is detached.
    pub(crate) fn join(self, timeout: Duration) -> bool {
        match self.exited.recv_timeout(timeout) {
            Ok(_) | Err(RecvTimeoutError::Disconnected) => {
                if self.handle.join().is_err() {
                    warn!("Event monitor thread panicked");
                }
                info!("Event monitor stopped");
                true
            }
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    "Event monitor did not exit within {:?}; detaching",
                    timeout
                );
                false
            }
        }
    }
}
