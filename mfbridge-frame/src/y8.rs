//! Y8 (8-bit luma) to RGB.

use crate::frame::{DecodedImage, PixelFormat, RawFrame};
use crate::processor::{Canvas, PixelError, SENTINEL, StreamProcessor, compose_rgb, coord_of_index};
use parking_lot::Mutex;
use tracing::debug;

/// Grey to RGB by channel replication.
#[derive(Debug, Default)]
pub struct Y8Processor {
    canvas: Mutex<Canvas>,
}

impl Y8Processor {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StreamProcessor for Y8Processor {
    fn format(&self) -> PixelFormat {
        PixelFormat::Y8
    }

    fn convert(&self, frame: &RawFrame<'_>) -> DecodedImage {
        let mut canvas = self.canvas.lock();
        let image = canvas.prepare(frame.width, frame.height);

        let mut faults = 0usize;
        for i in 0..frame.pixel_count() {
            let (x, y) = coord_of_index(i, frame.width);
            let pixel = frame
                .data
                .get(i)
                .ok_or(PixelError::MissingSample(i))
                .and_then(|&luma| {
                    let luma = i32::from(luma);
                    compose_rgb(luma, luma, luma)
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
                "Y8 frame {}x{}: {} malformed samples replaced",
                frame.width, frame.height, faults
            );
        }

        canvas.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn y8(data: &[u8], width: u32, height: u32) -> RawFrame<'_> {
        RawFrame::new(data, width, height, 0, PixelFormat::Y8)
    }

    #[test]
    fn test_single_pixel() {
        let processor = Y8Processor::new();
        let image = processor.convert(&y8(&[200], 1, 1));
        assert_eq!(image.dimensions(), (1, 1));
        assert_eq!(image.pixel(0, 0), Some([200, 200, 200]));
        assert_eq!(image.packed_rgb(0, 0), Some(0xC8C8C8));
    }

    #[test]
    fn test_row_major_layout() {
        let processor = Y8Processor::new();
        let image = processor.convert(&y8(&[10, 20, 30, 40, 50, 60], 3, 2));
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.pixel(2, 0), Some([30, 30, 30]));
        assert_eq!(image.pixel(0, 1), Some([40, 40, 40]));
        assert_eq!(image.pixel(2, 1), Some([60, 60, 60]));
    }

    #[test]
    fn test_missing_sample_becomes_sentinel() {
        let processor = Y8Processor::new();
        let image = processor.convert(&y8(&[1, 2, 3], 2, 2));
        assert_eq!(image.pixel(0, 0), Some([1, 1, 1]));
        assert_eq!(image.pixel(1, 0), Some([2, 2, 2]));
        assert_eq!(image.pixel(0, 1), Some([3, 3, 3]));
        assert_eq!(image.pixel(1, 1), Some(SENTINEL.0));
    }

    #[test]
    fn test_result_independent_of_canvas() {
        let processor = Y8Processor::new();
        let first = processor.convert(&y8(&[7, 7, 7, 7], 2, 2));
        let second = processor.convert(&y8(&[9, 9, 9, 9], 2, 2));
        assert_eq!(first.pixel(1, 1), Some([7, 7, 7]));
        assert_eq!(second.pixel(1, 1), Some([9, 9, 9]));
    }

    #[test]
    fn test_resize_between_frames() {
        let processor = Y8Processor::new();
        processor.convert(&y8(&[1; 4], 2, 2));
        let image = processor.convert(&y8(&[5; 6], 3, 2));
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.pixel(2, 1), Some([5, 5, 5]));
    }

    #[test]
    fn test_empty_frame() {
        let processor = Y8Processor::new();
        let image = processor.convert(&y8(&[], 0, 0));
        assert_eq!(image.dimensions(), (0, 0));
    }

    #[test]
    fn test_concurrent_convert() {
        let processor = std::sync::Arc::new(Y8Processor::new());
        let handles: Vec<_> = (0..4u8)
            .map(|n| {
                let processor = processor.clone();
                std::thread::spawn(move || {
                    let data = vec![n; 16];
                    let image = processor.convert(&RawFrame::new(&data, 4, 4, 0, PixelFormat::Y8));
                    image.pixel(3, 3)
                })
            })
            .collect();

        for (n, handle) in handles.into_iter().enumerate() {
            let n = n as u8;
            assert_eq!(handle.join().unwrap(), Some([n, n, n]));
        }
    }
}
