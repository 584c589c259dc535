//! mfbridge Frame - Raw capture sample conversion
//!
//! Converts the raw per-frame buffers delivered by the native capture backend
//! into RGB images a caller can display or hand to other image tooling.
//!
//! - [`Y8Processor`]: single channel 8-bit luma, replicated into R, G and B
//! - [`Yuy2Processor`]: packed 4:2:2 YUV (`Y0 U Y1 V`), BT.601 full range
//!
//! ## Example
//!
//! ```ignore
//! use mfbridge_frame::{PixelFormat, RawFrame, StreamProcessor, Y8Processor};
//!
//! let processor = Y8Processor::new();
//! let frame = RawFrame::new(&samples, 640, 480, timestamp, PixelFormat::Y8);
//! let image = processor.convert(&frame);
//! ```

mod frame;
mod processor;
mod y8;
mod yuy2;

pub use frame::{DecodedImage, PixelFormat, RawFrame};
pub use processor::{PixelError, SENTINEL, StreamProcessor, compose_rgb, coord_of_index, processor_for};
pub use y8::Y8Processor;
pub use yuy2::Yuy2Processor;
