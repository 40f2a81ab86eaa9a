use crate::frame_stream::common::error::{Result, StreamError};
use crate::frame_stream::pixel::types::{
    Frame, PackedBuffer, QuantizedPreview, RGB565_BYTES, RGBA_BYTES,
};

const RED_MASK: u8 = 0xF8;
const GREEN_MASK: u8 = 0xFC;
const BLUE_MASK: u8 = 0xF8;

/// Result of packing one pixel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedPixel {
    /// Masked RGBA sample, alpha always 0
    pub quantized: [u8; 4],
    /// RGB565 bytes in wire order
    pub bytes: [u8; 2],
}

/// Packs one RGB888 sample into 5-6-5 bits.
///
/// Channels are truncated, not rounded: red and blue keep their top five
/// bits, green its top six. The high three green bits land in the low bits
/// of the first byte, the next three in the high bits of the second.
#[inline]
pub fn pack_pixel(r: u8, g: u8, b: u8) -> PackedPixel {
    let r = r & RED_MASK;
    let g = g & GREEN_MASK;
    let b = b & BLUE_MASK;

    PackedPixel {
        quantized: [r, g, b, 0],
        bytes: [r | (g >> 5), ((g & 0x1C) << 3) | (b >> 3)],
    }
}

/// Recovers the masked RGB channels from two RGB565 bytes.
#[inline]
pub fn unpack_pixel(bytes: [u8; 2]) -> [u8; 3] {
    let [hi, lo] = bytes;
    [
        hi & RED_MASK,
        ((hi & 0x07) << 5) | ((lo & 0xE0) >> 3),
        (lo & 0x1F) << 3,
    ]
}

fn ensure_same_shape(frame: &Frame, width: usize, height: usize) -> Result<()> {
    if frame.width != width || frame.height != height {
        return Err(StreamError::DimensionMismatch {
            frame_width: frame.width,
            frame_height: frame.height,
            target_width: width,
            target_height: height,
        });
    }
    Ok(())
}

/// Packs every pixel of `frame` in row-major order, overwriting both the
/// wire buffer and the preview in place.
pub fn pack_frame(
    frame: &Frame,
    packed: &mut PackedBuffer,
    preview: &mut QuantizedPreview,
) -> Result<()> {
    ensure_same_shape(frame, packed.width(), packed.height())?;
    ensure_same_shape(frame, preview.width, preview.height)?;

    let pixels = frame
        .as_bytes()
        .chunks_exact(RGBA_BYTES)
        .zip(packed.as_bytes_mut().chunks_exact_mut(RGB565_BYTES))
        .zip(preview.as_bytes_mut().chunks_exact_mut(RGBA_BYTES));

    for ((src, wire), quantized) in pixels {
        let px = pack_pixel(src[0], src[1], src[2]);
        wire.copy_from_slice(&px.bytes);
        quantized.copy_from_slice(&px.quantized);
    }

    Ok(())
}

/// Expands an RGB565 payload into interleaved RGB8, as the remote panel
/// would display it.
pub fn unpack_frame(packed: &[u8], rgb: &mut [u8]) -> Result<()> {
    let pixels = packed.len() / RGB565_BYTES;
    if packed.len() % RGB565_BYTES != 0 || rgb.len() != pixels * 3 {
        return Err(StreamError::DimensionMismatch {
            frame_width: pixels,
            frame_height: 1,
            target_width: rgb.len() / 3,
            target_height: 1,
        });
    }

    for (wire, out) in packed
        .chunks_exact(RGB565_BYTES)
        .zip(rgb.chunks_exact_mut(3))
    {
        out.copy_from_slice(&unpack_pixel([wire[0], wire[1]]));
    }

    Ok(())
}
