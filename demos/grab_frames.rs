//! Activate the first device and save the most recent Y8 frame as a PNG.
//!
//! ```bash
//! MFBRIDGE_NATIVE_LIB=/path/to/libmfbridge.so cargo run --example grab_frames -- out.png
//! ```

use mfbridge::{CaptureController, ImageSink, LoggingConfig, init_logging};
use std::sync::Arc;
use std::time::Duration;

fn main() {
    init_logging(&LoggingConfig::default());

    let output = std::env::args().nth(1).unwrap_or_else(|| "frame.png".to_string());

    let controller = CaptureController::global();
    let sink = Arc::new(ImageSink::new());
    controller.set_sink(sink.clone());

    if !controller.initialize() {
        eprintln!("Failed to initialise capture engine");
        std::process::exit(1);
    }

    match controller.activate_device(0) {
        Ok(true) => {}
        Ok(false) => {
            eprintln!("Device 0 refused activation");
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    }

    std::thread::sleep(Duration::from_secs(2));
    let _ = controller.deactivate_device(0);

    match sink.latest() {
        Some((image, timestamp)) => {
            println!(
                "{} frames, last at {} ({}x{})",
                sink.frame_count(),
                timestamp,
                image.width(),
                image.height()
            );
            if let Err(e) = image.as_rgb_image().save(&output) {
                eprintln!("Failed to save {output}: {e}");
            }
        }
        None => println!("No Y8 frames received"),
    }

    controller.uninitialise();
}
