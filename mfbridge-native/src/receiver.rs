//! The receiving end of the native notification channel.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use mfbridge_frame::RawFrame;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// One notification from the native layer.
#[derive(Debug, Clone, Copy)]
pub enum NativeEvent<'a> {
    NewDevice,
    LostDevice(i32),
    Error { code: i32, message: &'a str },
    Frame(RawFrame<'a>),
}

type Dispatch = Box<dyn Fn(NativeEvent<'_>) + Send + Sync>;

/// Handed to [`crate::NativeBackend::monitor`]; the backend calls into it once
/// per event from the monitoring thread.
///
/// Also carries the readiness one-shot and the stop request channel.
pub struct EventReceiver {
    dispatch: Dispatch,
    ready: Sender<()>,
    stop: Receiver<()>,
    stopped: AtomicBool,
}

impl EventReceiver {
    /// `ready` should be a bounded(1) channel; only the first signal is kept.
    pub fn new(
        dispatch: impl Fn(NativeEvent<'_>) + Send + Sync + 'static,
        ready: Sender<()>,
        stop: Receiver<()>,
    ) -> Self {
        Self {
            dispatch: Box::new(dispatch),
            ready,
            stop,
            stopped: AtomicBool::new(false),
        }
    }

    /// The native layer is ready to answer enumeration requests.
    pub fn ready(&self) {
        let _ = self.ready.try_send(());
    }

    pub fn new_device(&self) {
        (self.dispatch)(NativeEvent::NewDevice);
    }

    pub fn lost_device(&self, index: i32) {
        (self.dispatch)(NativeEvent::LostDevice(index));
    }

    pub fn error(&self, code: i32, message: &str) {
        (self.dispatch)(NativeEvent::Error { code, message });
    }

    pub fn frame(&self, frame: RawFrame<'_>) {
        (self.dispatch)(NativeEvent::Frame(frame));
    }

    /// Non-blocking check for a stop request. Latches once seen.
    pub fn stop_requested(&self) -> bool {
        if self.stopped.load(Ordering::Acquire) {
            return true;
        }
        match self.stop.try_recv() {
            Ok(()) | Err(TryRecvError::Disconnected) => {
                self.stopped.store(true, Ordering::Release);
                true
            }
            Err(TryRecvError::Empty) => false,
        }
    }

    /// Block until a stop request arrives or `timeout` elapses.
    pub fn wait_for_stop(&self, timeout: Duration) -> bool {
        if self.stop_requested() {
            return true;
        }
        match self.stop.recv_timeout(timeout) {
            Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                self.stopped.store(true, Ordering::Release);
                true
            }
            Err(RecvTimeoutError::Timeout) => false,
        }
    }
}

impl std::fmt::Debug for EventReceiver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventReceiver")
            .field("stopped", &self.stopped.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
