//! Notification sinks.

use mfbridge_frame::{DecodedImage, RawFrame, StreamProcessor, Y8Processor};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, info, warn};

/// Receives device and stream notifications.
///
/// Called on the event monitor thread. Implementations must not block for
/// long (it stalls further delivery), must not panic, and must not call
/// back into the controller's `initialize`/`uninitialise`.
pub trait Sink: Send + Sync {
    /// A capture device was attached. Re-enumerate to see it.
    fn on_new_device(&self);

    /// The device at `device_index` was lost.
    fn on_lost_device(&self, device_index: i32);

    /// A native or lifecycle failure.
    fn on_error(&self, code: i32, message: &str);

    /// A raw frame from an active device.
    fn on_frame(&self, _frame: &RawFrame<'_>) {}
}

/// Default sink: logs every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl Sink for LogSink {
    fn on_new_device(&self) {
        info!("Capture device attached");
    }

    fn on_lost_device(&self, device_index: i32) {
        info!("Capture device {} lost", device_index);
    }

    fn on_error(&self, code: i32, message: &str) {
        warn!("Capture error {}: {}", code, message);
    }
}

/// Converts frames as they arrive and keeps the most recent one.
///
/// Device notifications go to the inner sink (a [`LogSink`] by default).
pub struct ImageSink<P: StreamProcessor = Y8Processor> {
    processor: P,
    latest: Mutex<Option<(DecodedImage, i64)>>,
    frames: AtomicU64,
    events: Arc<dyn Sink>,
}

impl ImageSink<Y8Processor> {
    pub fn new() -> Self {
        Self::with_processor(Y8Processor::new())
    }
}

impl Default for ImageSink<Y8Processor> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: StreamProcessor> ImageSink<P> {
    pub fn with_processor(processor: P) -> Self {
        Self {
            processor,
            latest: Mutex::new(None),
            frames: AtomicU64::new(0),
            events: Arc::new(LogSink),
        }
    }

    /// Forward device notifications to `events`.
    pub fn with_events(mut self, events: Arc<dyn Sink>) -> Self {
        self.events = events;
        self
    }

    /// Most recent image and its timestamp.
    pub fn latest(&self) -> Option<(DecodedImage, i64)> {
        self.latest.lock().clone()
    }

    /// Frames converted so far.
    pub fn frame_count(&self) -> u64 {
        self.frames.load(Ordering::Relaxed)
    }
}

impl<P: StreamProcessor> Sink for ImageSink<P> {
    fn on_new_device(&self) {
        self.events.on_new_device();
    }

    fn on_lost_device(&self, device_index: i32) {
        self.events.on_lost_device(device_index);
    }

    fn on_error(&self, code: i32, message: &str) {
        self.events.on_error(code, message);
    }

    fn on_frame(&self, frame: &RawFrame<'_>) {
        if frame.format != self.processor.format() {
            debug!(
                "Dropping {:?} frame, processor expects {:?}",
                frame.format,
                self.processor.format()
            );
            return;
        }

        let image = self.processor.convert(frame);
        *self.latest.lock() = Some((image, frame.timestamp));
        self.frames.fetch_add(1, Ordering::Relaxed);
    }
}
