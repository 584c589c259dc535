//! C ABI of the native capture engine, loaded through `libloading`.
//!
//! Exported symbols:
//!
//! | Symbol                  | Signature                                              |
//! |-------------------------|--------------------------------------------------------|
//! | `mfb_list_devices`      | `int32_t (void (*)(void*, const char*), void*)`        |
//! | `mfb_initialise`        | `bool (void)`                                          |
//! | `mfb_monitor`           | `bool (const MfbReceiver*)`                            |
//! | `mfb_uninitialise`      | `bool (void)`                                          |
//! | `mfb_activate_device`   | `bool (const char*)`                                   |
//! | `mfb_deactivate_device` | `bool (const char*)`                                   |

use crate::backend::NativeBackend;
use crate::error::BootstrapError;
use crate::receiver::EventReceiver;
use libloading::Library;
use mfbridge_frame::{PixelFormat, RawFrame};
use std::ffi::{CStr, CString, c_char, c_void};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::path::Path;
use tracing::{error, info, warn};

type StringCallback = extern "C" fn(*mut c_void, *const c_char);
type ListDevicesFn = unsafe extern "C" fn(StringCallback, *mut c_void) -> i32;
type BoolFn = unsafe extern "C" fn() -> bool;
type MonitorFn = unsafe extern "C" fn(*const MfbReceiver) -> bool;
type DeviceFn = unsafe extern "C" fn(*const c_char) -> bool;

/// Callback table passed to `mfb_monitor`. `context` is handed back verbatim.
#[repr(C)]
pub struct MfbReceiver {
    pub context: *mut c_void,
    pub on_ready: extern "C" fn(*mut c_void),
    pub on_new_device: extern "C" fn(*mut c_void),
    pub on_lost_device: extern "C" fn(*mut c_void, i32),
    pub on_error: extern "C" fn(*mut c_void, i32, *const c_char),
    /// `(context, data, len, width, height, timestamp, fourcc)`
    pub on_frame: extern "C" fn(*mut c_void, *const u8, usize, u32, u32, i64, u32),
    pub should_stop: extern "C" fn(*mut c_void) -> bool,
}

/// Run a callback body without letting a panic unwind into native code.
fn guarded(name: &str, body: impl FnOnce()) {
    if catch_unwind(AssertUnwindSafe(body)).is_err() {
        error!("Panic in native callback {}", name);
    }
}

/// # Safety
/// `context` must be the `EventReceiver` pointer placed in the table by
/// [`NativeLibrary::monitor`], which outlives the `mfb_monitor` call.
unsafe fn receiver<'a>(context: *mut c_void) -> &'a EventReceiver {
    unsafe { &*(context as *const EventReceiver) }
}

fn lossy(text: *const c_char) -> String {
    if text.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(text) }.to_string_lossy().into_owned()
}

extern "C" fn on_ready(context: *mut c_void) {
    guarded("on_ready", || unsafe { receiver(context) }.ready());
}

extern "C" fn on_new_device(context: *mut c_void) {
    guarded("on_new_device", || unsafe { receiver(context) }.new_device());
}

extern "C" fn on_lost_device(context: *mut c_void, index: i32) {
    guarded("on_lost_device", || unsafe { receiver(context) }.lost_device(index));
}

extern "C" fn on_error(context: *mut c_void, code: i32, message: *const c_char) {
    guarded("on_error", || {
        let message = lossy(message);
        unsafe { receiver(context) }.error(code, &message);
    });
}

extern "C" fn on_frame(
    context: *mut c_void,
    data: *const u8,
    len: usize,
    width: u32,
    height: u32,
    timestamp: i64,
    fourcc: u32,
) {
    guarded("on_frame", || {
        let data = if data.is_null() || len == 0 {
            &[][..]
        } else {
            unsafe { std::slice::from_raw_parts(data, len) }
        };
        let frame = RawFrame::new(data, width, height, timestamp, PixelFormat::from_fourcc(fourcc));
        unsafe { receiver(context) }.frame(frame);
    });
}

extern "C" fn should_stop(context: *mut c_void) -> bool {
    catch_unwind(AssertUnwindSafe(|| unsafe { receiver(context) }.stop_requested())).unwrap_or(true)
}

extern "C" fn collect_string(context: *mut c_void, text: *const c_char) {
    guarded("list_devices", || {
        let out = unsafe { &mut *(context as *mut Vec<String>) };
        out.push(lossy(text));
    });
}

/// The native capture engine loaded from a shared library.
pub struct NativeLibrary {
    list_devices: ListDevicesFn,
    initialise: BoolFn,
    monitor: MonitorFn,
    uninitialise: BoolFn,
    activate_device: DeviceFn,
    deactivate_device: DeviceFn,
    // Keeps the function pointers above valid; dropped last.
    _library: Library,
}

impl NativeLibrary {
    /// Load the library at `path` and resolve every symbol.
    pub fn open(path: &Path) -> Result<Self, BootstrapError> {
        // libloading folds permission failures into an opaque loader message.
        if let Err(e) = std::fs::File::open(path) {
            if e.kind() == std::io::ErrorKind::PermissionDenied {
                return Err(BootstrapError::AccessDenied(format!("{}: {}", path.display(), e)));
            }
        }

        let library = unsafe { Library::new(path) }?;
        let (list_devices, initialise, monitor, uninitialise, activate_device, deactivate_device) = unsafe {
            (
                *library.get::<ListDevicesFn>(b"mfb_list_devices\0")?,
                *library.get::<BoolFn>(b"mfb_initialise\0")?,
                *library.get::<MonitorFn>(b"mfb_monitor\0")?,
                *library.get::<BoolFn>(b"mfb_uninitialise\0")?,
                *library.get::<DeviceFn>(b"mfb_activate_device\0")?,
                *library.get::<DeviceFn>(b"mfb_deactivate_device\0")?,
            )
        };
        let native = Self {
            list_devices,
            initialise,
            monitor,
            uninitialise,
            activate_device,
            deactivate_device,
            _library: library,
        };

        info!("Native library loaded from {}", path.display());
        Ok(native)
    }

    /// Keep the collected strings only if the native call succeeded.
    fn listing(status: i32, collected: Vec<String>) -> Option<Vec<String>> {
        if status < 0 {
            warn!(
                "mfb_list_devices returned {}; discarding {} collected entries",
                status,
                collected.len()
            );
            return None;
        }
        Some(collected)
    }

    fn with_link(symbolic_link: &str, call: impl FnOnce(*const c_char) -> bool) -> bool {
        match CString::new(symbolic_link) {
            Ok(link) => call(link.as_ptr()),
            Err(_) => {
                warn!("Symbolic link contains an interior NUL: {:?}", symbolic_link);
                false
            }
        }
    }
}

impl NativeBackend for NativeLibrary {
    fn list_devices(&self) -> Option<Vec<String>> {
        let mut out: Vec<String> = Vec::new();
        let status = unsafe { (self.list_devices)(collect_string, &mut out as *mut Vec<String> as *mut c_void) };
        Self::listing(status, out)
    }

    fn initialise(&self) -> bool {
        unsafe { (self.initialise)() }
    }

    fn monitor(&self, receiver: &EventReceiver) -> bool {
        let table = MfbReceiver {
            context: receiver as *const EventReceiver as *mut c_void,
            on_ready,
            on_new_device,
            on_lost_device,
            on_error,
            on_frame,
            should_stop,
        };
        unsafe { (self.monitor)(&table) }
    }

    fn uninitialise(&self) -> bool {
        unsafe { (self.uninitialise)() }
    }

    fn activate_device(&self, symbolic_link: &str) -> bool {
        Self::with_link(symbolic_link, |link| unsafe { (self.activate_device)(link) })
    }

    fn deactivate_device(&self, symbolic_link: &str) -> bool {
        Self::with_link(symbolic_link, |link| unsafe { (self.deactivate_device)(link) })
    }
}

impl std::fmt::Debug for NativeLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NativeLibrary").finish_non_exhaustive()
    }
}
