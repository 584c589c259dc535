//! Scripted backend and recording sink for unit tests.

use crate::sink::Sink;
use crossbeam_channel::{Receiver, Sender, bounded};
use mfbridge_frame::{PixelFormat, RawFrame};
use mfbridge_native::{EventReceiver, NativeBackend};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

/// Something for the mock to emit once monitoring starts.
#[derive(Debug, Clone)]
pub enum Scripted {
    NewDevice,
    LostDevice(i32),
    Error(i32, String),
    Frame(Vec<u8>, u32, u32, i64),
}

pub struct MockBackend {
    raw: Mutex<Vec<String>>,
    script: Mutex<Vec<Scripted>>,
    /// Emitted after `monitor` has been asked to stop.
    on_stop: Mutex<Vec<Scripted>>,
    pub list_ok: AtomicBool,
    pub init_ok: AtomicBool,
    pub monitor_ok: AtomicBool,
    pub uninit_ok: AtomicBool,
    pub activate_ok: AtomicBool,
    pub signal_ready: AtomicBool,
    /// Ignore stop requests; only `release` ends `monitor`.
    pub ignore_stop: AtomicBool,
    release: (Sender<()>, Receiver<()>),
    initialise_calls: AtomicUsize,
    monitor_calls: AtomicUsize,
    uninitialise_calls: AtomicUsize,
    activated: Mutex<Vec<String>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            raw: Mutex::new(Vec::new()),
            script: Mutex::new(Vec::new()),
            on_stop: Mutex::new(Vec::new()),
            list_ok: AtomicBool::new(true),
            init_ok: AtomicBool::new(true),
            monitor_ok: AtomicBool::new(true),
            uninit_ok: AtomicBool::new(true),
            activate_ok: AtomicBool::new(true),
            signal_ready: AtomicBool::new(true),
            ignore_stop: AtomicBool::new(false),
            release: bounded(1),
            initialise_calls: AtomicUsize::new(0),
            monitor_calls: AtomicUsize::new(0),
            uninitialise_calls: AtomicUsize::new(0),
            activated: Mutex::new(Vec::new()),
        }
    }
}

impl MockBackend {
    pub fn with_devices(devices: &[(&str, &str, &str)]) -> Self {
        let backend = Self::default();
        backend.set_devices(devices);
        backend
    }

    pub fn set_devices(&self, devices: &[(&str, &str, &str)]) {
        let raw = devices
            .iter()
            .flat_map(|(name, link, parent)| [name.to_string(), link.to_string(), parent.to_string()])
            .collect();
        self.set_raw(raw);
    }

    pub fn set_raw(&self, raw: Vec<String>) {
        *self.raw.lock() = raw;
    }

    pub fn script(&self, events: Vec<Scripted>) {
        *self.script.lock() = events;
    }

    pub fn script_on_stop(&self, events: Vec<Scripted>) {
        *self.on_stop.lock() = events;
    }

    /// Unblock a `monitor` call that ignores stop requests.
    pub fn release(&self) {
        let _ = self.release.0.try_send(());
    }

    pub fn initialise_calls(&self) -> usize {
        self.initialise_calls.load(Ordering::SeqCst)
    }

    pub fn monitor_calls(&self) -> usize {
        self.monitor_calls.load(Ordering::SeqCst)
    }

    pub fn uninitialise_calls(&self) -> usize {
        self.uninitialise_calls.load(Ordering::SeqCst)
    }

    pub fn activated(&self) -> Vec<String> {
        self.activated.lock().clone()
    }
}

fn emit(receiver: &EventReceiver, events: Vec<Scripted>) {
    for event in events {
        match event {
            Scripted::NewDevice => receiver.new_device(),
            Scripted::LostDevice(index) => receiver.lost_device(index),
            Scripted::Error(code, message) => receiver.error(code, &message),
            Scripted::Frame(data, width, height, timestamp) => {
                receiver.frame(RawFrame::new(&data, width, height, timestamp, PixelFormat::Y8))
            }
        }
    }
}

impl NativeBackend for MockBackend {
    fn list_devices(&self) -> Option<Vec<String>> {
        self.list_ok
            .load(Ordering::SeqCst)
            .then(|| self.raw.lock().clone())
    }

    fn initialise(&self) -> bool {
        self.initialise_calls.fetch_add(1, Ordering::SeqCst);
        self.init_ok.load(Ordering::SeqCst)
    }

    fn monitor(&self, receiver: &EventReceiver) -> bool {
        self.monitor_calls.fetch_add(1, Ordering::SeqCst);
        if !self.monitor_ok.load(Ordering::SeqCst) {
            return false;
        }

        let script = self.script.lock().clone();
        emit(receiver, script);

        if self.signal_ready.load(Ordering::SeqCst) {
            receiver.ready();
        }

        if self.ignore_stop.load(Ordering::SeqCst) {
            let _ = self.release.1.recv_timeout(Duration::from_secs(10));
        } else {
            receiver.wait_for_stop(Duration::from_secs(10));
        }

        let on_stop = self.on_stop.lock().clone();
        emit(receiver, on_stop);
        true
    }

    fn uninitialise(&self) -> bool {
        self.uninitialise_calls.fetch_add(1, Ordering::SeqCst);
        self.uninit_ok.load(Ordering::SeqCst)
    }

    fn activate_device(&self, symbolic_link: &str) -> bool {
        let ok = self.activate_ok.load(Ordering::SeqCst);
        if ok {
            self.activated.lock().push(symbolic_link.to_string());
        }
        ok
    }

    fn deactivate_device(&self, symbolic_link: &str) -> bool {
        self.activated.lock().retain(|link| link != symbolic_link);
        true
    }
}

/// Records notifications as short strings.
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().clone()
    }

    pub fn error_codes(&self) -> Vec<i32> {
        self.events()
            .iter()
            .filter_map(|event| event.strip_prefix("error "))
            .filter_map(|rest| rest.split(' ').next())
            .filter_map(|code| code.parse().ok())
            .collect()
    }
}

impl Sink for RecordingSink {
    fn on_new_device(&self) {
        self.events.lock().push("new".to_string());
    }

    fn on_lost_device(&self, device_index: i32) {
        self.events.lock().push(format!("lost {device_index}"));
    }

    fn on_error(&self, code: i32, message: &str) {
        self.events.lock().push(format!("error {code} {message}"));
    }

    fn on_frame(&self, frame: &RawFrame<'_>) {
        self.events
            .lock()
            .push(format!("frame {}x{} @{}", frame.width, frame.height, frame.timestamp));
    }
}
