//! Frame data structures for captured camera content

use std::io::Cursor;
use std::time::Instant;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, RgbaImage};
use thiserror::Error;

/// A single frame read from a live device stream
#[derive(Debug, Clone)]
pub struct CapturedFrame {
    /// Raw RGBA pixel data
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Timestamp when frame was read
    pub timestamp: Instant,
}

/// Failure while turning a frame into a still image
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("frame buffer holds {actual} bytes, expected {expected} for {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("frame has zero area")]
    Empty,

    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),
}

impl CapturedFrame {
    /// Create a new captured frame
    pub fn new(data: Vec<u8>, width: u32, height: u32) -> Self {
        Self {
            data,
            width,
            height,
            timestamp: Instant::now(),
        }
    }

    /// Get frame dimensions as (width, height)
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Encode the frame as a JPEG still at its native resolution.
    ///
    /// JPEG carries no alpha, so the frame is flattened to RGB first.
    pub fn encode_jpeg(self, quality: u8) -> Result<Vec<u8>, EncodeError> {
        if self.width == 0 || self.height == 0 {
            return Err(EncodeError::Empty);
        }

        let expected = self.width as usize * self.height as usize * 4;
        let actual = self.data.len();
        let (width, height) = self.dimensions();
        let rgba = RgbaImage::from_raw(width, height, self.data).ok_or(EncodeError::BufferSize {
            width,
            height,
            expected,
            actual,
        })?;
        let rgb = DynamicImage::ImageRgba8(rgba).to_rgb8();

        let mut out = Cursor::new(Vec::new());
        JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100)).encode_image(&rgb)?;
        Ok(out.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid_frame(width: u32, height: u32) -> CapturedFrame {
        let data = [200u8, 40, 40, 255].repeat((width * height) as usize);
        CapturedFrame::new(data, width, height)
    }

    #[test]
    fn test_encode_jpeg_keeps_native_resolution() {
        let bytes = solid_frame(64, 48).encode_jpeg(90).unwrap();
        assert_eq!(&bytes[..2], &[0xFF, 0xD8]);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (64, 48));
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        let frame = CapturedFrame::new(vec![0; 10], 4, 4);
        assert!(matches!(
            frame.encode_jpeg(90),
            Err(EncodeError::BufferSize { expected: 64, actual: 10, .. })
        ));
    }

    #[test]
    fn test_encode_rejects_empty_frame() {
        let frame = CapturedFrame::new(Vec::new(), 0, 0);
        assert!(matches!(frame.encode_jpeg(90), Err(EncodeError::Empty)));
    }
}
