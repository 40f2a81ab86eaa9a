//! RGB565 pixel packing module
//!
//! Conversion from 8-bit RGBA frames to the 16-bit wire format and the
//! quantized preview that mirrors what the remote panel can show.

mod packer;
pub mod types;

pub use packer::{PackedPixel, pack_frame, pack_pixel, unpack_frame, unpack_pixel};
pub use types::{Frame, PackedBuffer, QuantizedPreview};
