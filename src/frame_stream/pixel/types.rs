//! Frame buffer types

use crate::frame_stream::common::error::{Result, StreamError};

/// Bytes per RGBA8 pixel.
pub const RGBA_BYTES: usize = 4;
/// Bytes per packed RGB565 pixel.
pub const RGB565_BYTES: usize = 2;

fn checked_pixel_count(width: usize, height: usize) -> Result<usize> {
    if width == 0 || height == 0 {
        return Err(StreamError::InvalidDimensions(width, height));
    }
    width
        .checked_mul(height)
        .filter(|count| count.checked_mul(RGBA_BYTES).is_some())
        .ok_or(StreamError::InvalidDimensions(width, height))
}

/// One sampled frame, RGBA8, row-major.
///
/// The pixel buffer is sized once at construction and never reallocated.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Width of the frame in pixels
    pub width: usize,
    /// Height of the frame in pixels
    pub height: usize,
    /// Interleaved [R, G, B, A, R, G, B, A, ...]
    data: Vec<u8>,
}

impl Frame {
    /// Allocates a zeroed frame.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let pixels = checked_pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; pixels * RGBA_BYTES],
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// Frame-shaped buffer of masked channels with alpha forced to zero.
///
/// Only ever rendered locally.
#[derive(Debug, Clone)]
pub struct QuantizedPreview {
    pub width: usize,
    pub height: usize,
    data: Vec<u8>,
}

impl QuantizedPreview {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let pixels = checked_pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; pixels * RGBA_BYTES],
        })
    }

    pub fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Quantized RGBA sample at (x, y), if in bounds.
    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let offset = (y * self.width + x) * RGBA_BYTES;
        let px = &self.data[offset..offset + RGBA_BYTES];
        Some([px[0], px[1], px[2], px[3]])
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

/// The wire payload: two RGB565 bytes per pixel, same order as the frame.
///
/// Allocated once per stream and overwritten every tick.
#[derive(Debug, Clone)]
pub struct PackedBuffer {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl PackedBuffer {
    pub fn new(width: usize, height: usize) -> Result<Self> {
        let pixels = checked_pixel_count(width, height)?;
        Ok(Self {
            width,
            height,
            data: vec![0; pixels * RGB565_BYTES],
        })
    }

    /// Size in bytes of a packed frame with the given dimensions.
    pub fn byte_len(width: usize, height: usize) -> usize {
        width * height * RGB565_BYTES
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub(crate) fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_panel_sizes() {
        let frame = Frame::new(160, 128).unwrap();
        let packed = PackedBuffer::new(160, 128).unwrap();

        assert_eq!(frame.pixel_count(), 20_480);
        assert_eq!(frame.as_bytes().len(), 81_920);
        assert_eq!(packed.len(), 40_960);
        assert_eq!(packed.len(), 2 * frame.pixel_count());
        assert_eq!(PackedBuffer::byte_len(160, 128), 40_960);
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(
            Frame::new(0, 128),
            Err(StreamError::InvalidDimensions(0, 128))
        ));
        assert!(matches!(
            PackedBuffer::new(160, 0),
            Err(StreamError::InvalidDimensions(160, 0))
        ));
    }

    #[test]
    fn test_preview_pixel_bounds() {
        let preview = QuantizedPreview::new(4, 2).unwrap();
        assert_eq!(preview.pixel(3, 1), Some([0, 0, 0, 0]));
        assert_eq!(preview.pixel(4, 0), None);
        assert_eq!(preview.pixel(0, 2), None);
    }
}
