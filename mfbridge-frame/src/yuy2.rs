//! YUY2 (packed YUV 4:2:2) to RGB.
//!
//! Each 4-byte macropixel `Y0 U Y1 V` covers two horizontally adjacent pixels.
//! Conversion uses BT.601 full-range coefficients in 16.16 fixed point.

use crate::frame::{DecodedImage, PixelFormat, RawFrame};
use crate::processor::{Canvas, PixelError, SENTINEL, StreamProcessor, compose_rgb, coord_of_index};
use image::Rgb;
use parking_lot::Mutex;
use tracing::debug;

#[derive(Debug, Default)]
pub struct Yuy2Processor {
    canvas: Mutex<Canvas>,
}

impl Yuy2Processor {
    pub fn new() -> Self {
        Self::default()
    }
}

fn yuv_to_rgb(y: u8, u: u8, v: u8) -> Result<Rgb<u8>, PixelError> {
    let y = i32::from(y);
    let u = i32::from(u) - 128;
    let v = i32::from(v) - 128;

    // 1.402, 0.344, 0.714, 1.772 scaled by 65536
    let r = y + ((91881 * v) >> 16);
    let g = y - ((22554 * u + 46802 * v) >> 16);
    let b = y + ((116130 * u) >> 16);

    compose_rgb(r.clamp(0, 255), g.clamp(0, 255), b.clamp(0, 255))
}

impl StreamProcessor for Yuy2Processor {
    fn format(&self) -> PixelFormat {
        PixelFormat::Yuy2
    }

    fn convert(&self, frame: &RawFrame<'_>) -> DecodedImage {
        let mut canvas = self.canvas.lock();
        let image = canvas.prepare(frame.width, frame.height);

        let mut faults = 0usize;
        for i in 0..frame.pixel_count() {
            let (x, y) = coord_of_index(i, frame.width);
            let offset = (i / 2) * 4;
            let pixel = frame
                .data
                .get(offset..offset + 4)
                .ok_or(PixelError::MissingSample(i))
                .and_then(|macropixel| {
                    let luma = if i % 2 == 0 { macropixel[0] } else { macropixel[2] };
                    yuv_to_rgb(luma, macropixel[1], macropixel[3])
                });

            match pixel {
                Ok(pixel) => image.put_pixel(x, y, pixel),
                Err(_) => {
                    faults += 1;
                    image.put_pixel(x, y, SENTINEL);
                }
            }
        }

        if faults > 0 {
            debug!(
                "YUY2 frame {}x{}: {} malformed samples replaced",
                frame.width, frame.height, faults
            );
        }

        canvas.snapshot()
    }
}
