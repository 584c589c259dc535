//! Frame types shared between the native layer and the processors.

use image::{Rgb, RgbImage};

/// Pixel layout of a raw sample buffer, identified by its FourCC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 8-bit luma only.
    Y8,
    /// Packed 4:2:2, `Y0 U Y1 V`.
    Yuy2,
    /// Any other FourCC reported by the backend.
    Unknown(u32),
}

impl PixelFormat {
    const Y800: u32 = u32::from_le_bytes(*b"Y800");
    const GREY: u32 = u32::from_le_bytes(*b"GREY");
    const YUY2: u32 = u32::from_le_bytes(*b"YUY2");

    /// Map a little-endian FourCC code to a format.
    pub fn from_fourcc(code: u32) -> Self {
        match code {
            Self::Y800 | Self::GREY => Self::Y8,
            Self::YUY2 => Self::Yuy2,
            other => Self::Unknown(other),
        }
    }

    /// The FourCC code for this format.
    pub fn fourcc(self) -> u32 {
        match self {
            Self::Y8 => Self::Y800,
            Self::Yuy2 => Self::YUY2,
            Self::Unknown(code) => code,
        }
    }

    /// Bytes per pixel in the raw buffer, if known.
    pub fn bytes_per_sample(self) -> Option<usize> {
        match self {
            Self::Y8 => Some(1),
            Self::Yuy2 => Some(2),
            Self::Unknown(_) => None,
        }
    }
}

/// One captured sample as delivered by the native backend.
///
/// Borrowed for the duration of the callback only.
#[derive(Debug, Clone, Copy)]
pub struct RawFrame<'a> {
    /// Tightly packed sample bytes.
    pub data: &'a [u8],
    pub width: u32,
    pub height: u32,
    /// Presentation time in 100ns units.
    pub timestamp: i64,
    pub format: PixelFormat,
}

impl<'a> RawFrame<'a> {
    /// Create a new frame view.
    pub fn new(data: &'a [u8], width: u32, height: u32, timestamp: i64, format: PixelFormat) -> Self {
        Self {
            data,
            width,
            height,
            timestamp,
            format,
        }
    }

    /// Number of pixels described by the frame dimensions.
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Expected buffer length for the frame's format, if the format is known.
    pub fn expected_len(&self) -> Option<usize> {
        self.format.bytes_per_sample().map(|bps| self.pixel_count() * bps)
    }
}

/// A converted frame, independent of any processor state.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    image: RgbImage,
}

impl DecodedImage {
    /// Get image dimensions (width, height).
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Channels of the pixel at `(x, y)` as `[r, g, b]`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 3]> {
        self.image.get_pixel_checked(x, y).map(|Rgb(channels)| *channels)
    }

    /// Pixel at `(x, y)` packed as `0xRRGGBB`.
    pub fn packed_rgb(&self, x: u32, y: u32) -> Option<u32> {
        self.pixel(x, y)
            .map(|[r, g, b]| (u32::from(r) << 16) | (u32::from(g) << 8) | u32::from(b))
    }

    /// Borrow the underlying image.
    pub fn as_rgb_image(&self) -> &RgbImage {
        &self.image
    }

    /// Take the underlying image.
    pub fn into_inner(self) -> RgbImage {
        self.image
    }
}

impl From<RgbImage> for DecodedImage {
    fn from(image: RgbImage) -> Self {
        Self { image }
    }
}
