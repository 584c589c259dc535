//! Stream processor trait and per-pixel helpers.

use crate::frame::{DecodedImage, PixelFormat, RawFrame};
use crate::{Y8Processor, Yuy2Processor};
use image::{Rgb, RgbImage};
use thiserror::Error;

/// Colour written in place of a pixel that could not be composed.
pub const SENTINEL: Rgb<u8> = Rgb([255, 0, 0]);

/// Per-pixel conversion failures. Never escapes a processor; the pixel is
/// replaced with [`SENTINEL`] instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PixelError {
    #[error("Sample {0} missing from buffer")]
    MissingSample(usize),

    #[error("Channel value {0} outside 0..=255")]
    ChannelOutOfRange(i32),
}

/// Build an RGB pixel from integer channel values.
pub fn compose_rgb(r: i32, g: i32, b: i32) -> Result<Rgb<u8>, PixelError> {
    let channel = |value: i32| u8::try_from(value).map_err(|_| PixelError::ChannelOutOfRange(value));
    Ok(Rgb([channel(r)?, channel(g)?, channel(b)?]))
}

/// Row-major `(x, y)` of sample `index` in a frame `width` pixels wide.
pub fn coord_of_index(index: usize, width: u32) -> (u32, u32) {
    let width = width as usize;
    ((index % width) as u32, (index / width) as u32)
}

/// Converts raw frames of one pixel format into RGB images.
///
/// Implementations keep one scratch canvas; concurrent `convert` calls on the
/// same instance are serialized.
pub trait StreamProcessor: Send + Sync {
    /// Source format this processor accepts.
    fn format(&self) -> PixelFormat;

    /// Convert a frame. Malformed samples become [`SENTINEL`] pixels.
    fn convert(&self, frame: &RawFrame<'_>) -> DecodedImage;
}

/// Pick the processor for a source format.
pub fn processor_for(format: PixelFormat) -> Option<Box<dyn StreamProcessor>> {
    match format {
        PixelFormat::Y8 => Some(Box::new(Y8Processor::new())),
        PixelFormat::Yuy2 => Some(Box::new(Yuy2Processor::new())),
        PixelFormat::Unknown(_) => None,
    }
}

/// Reusable output buffer for a processor.
#[derive(Debug, Default)]
pub(crate) struct Canvas {
    image: RgbImage,
}

impl Canvas {
    /// Borrow the canvas at the requested size, reallocating on a size change.
    pub(crate) fn prepare(&mut self, width: u32, height: u32) -> &mut RgbImage {
        if self.image.dimensions() != (width, height) {
            self.image = RgbImage::new(width, height);
        }
        &mut self.image
    }

    /// Copy the canvas out so the caller never aliases it.
    pub(crate) fn snapshot(&self) -> DecodedImage {
        DecodedImage::from(self.image.clone())
    }
}
