//! List capture devices and print device events until Enter is pressed.
//!
//! ```bash
//! MFBRIDGE_NATIVE_LIB=/path/to/libmfbridge.so cargo run --example list_devices
//! ```

use mfbridge::{CaptureController, LogSink, LoggingConfig, diagnostics, init_logging};
use std::sync::Arc;

fn main() {
    init_logging(&LoggingConfig {
        level: "debug".to_string(),
        ..LoggingConfig::default()
    });

    if !diagnostics::is_backend_loaded() {
        eprintln!(
            "Native backend not loaded (64-bit: {}, accessible: {}): {}",
            diagnostics::is_os_64bit(),
            diagnostics::is_backend_accessible(),
            diagnostics::last_backend_error().unwrap_or_default()
        );
        std::process::exit(1);
    }

    let controller = CaptureController::global();
    controller.set_sink(Arc::new(LogSink));

    if !controller.initialize() {
        eprintln!("Failed to initialise capture engine");
        std::process::exit(1);
    }

    for device in controller.devices() {
        println!(
            "{}: {} [{}] parent={}",
            device.id, device.friendly_name, device.symbolic_link, device.parent_id
        );
    }

    println!("Watching for device changes, press Enter to exit");
    let mut line = String::new();
    let _ = std::io::stdin().read_line(&mut line);

    controller.uninitialise();
}
