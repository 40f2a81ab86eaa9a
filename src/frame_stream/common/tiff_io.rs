use std::fs::File;
use std::io::{BufReader, Cursor};
use std::path::Path;

use tiff::ColorType;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{TiffEncoder, colortype::RGB8};
use tracing::debug;

use crate::frame_stream::common::error::{Result, StreamError};

/// Decoded 8-bit image expanded to RGBA.
#[derive(Debug, Clone)]
pub struct RgbaImage {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
}

/// Encodes interleaved RGB8 samples as an uncompressed TIFF.
pub fn encode_rgb8(width: u32, height: u32, rgb: &[u8]) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();

    let mut encoder = TiffEncoder::new(Cursor::new(&mut buffer))
        .map_err(|e| StreamError::EncodeError(e.to_string()))?;
    encoder
        .write_image::<RGB8>(width, height, rgb)
        .map_err(|e| StreamError::EncodeError(e.to_string()))?;

    Ok(buffer)
}

/// Writes an RGB8 TIFF next to `path` and renames it into place, so readers
/// polling the file never observe a half-written image.
pub fn write_rgb8_atomic(path: &Path, width: u32, height: u32, rgb: &[u8]) -> Result<()> {
    let encoded = encode_rgb8(width, height, rgb)?;

    let mut staging = path.as_os_str().to_owned();
    staging.push(".part");
    std::fs::write(&staging, &encoded)?;
    std::fs::rename(&staging, path)?;

    debug!("Wrote {}x{} TIFF to {}", width, height, path.display());
    Ok(())
}

/// Reads an 8-bit gray, RGB or RGBA TIFF and expands it to RGBA.
pub fn read_rgba8(path: &Path) -> Result<RgbaImage> {
    let file = File::open(path)
        .map_err(|e| StreamError::DecodeError(format!("{}: {}", path.display(), e)))?;
    let mut decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| StreamError::DecodeError(format!("{}: {}", path.display(), e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| StreamError::DecodeError(e.to_string()))?;
    let color = decoder
        .colortype()
        .map_err(|e| StreamError::DecodeError(e.to_string()))?;

    let samples = match decoder
        .read_image()
        .map_err(|e| StreamError::DecodeError(e.to_string()))?
    {
        DecodingResult::U8(samples) => samples,
        _ => {
            return Err(StreamError::UnsupportedFormat(format!(
                "{}: only 8-bit samples are supported",
                path.display()
            )));
        }
    };

    let pixel_count = width as usize * height as usize;
    let mut data = Vec::with_capacity(pixel_count * 4);
    match color {
        ColorType::Gray(8) => {
            for &v in samples.iter().take(pixel_count) {
                data.extend_from_slice(&[v, v, v, 0xFF]);
            }
        }
        ColorType::RGB(8) => {
            for px in samples.chunks_exact(3).take(pixel_count) {
                data.extend_from_slice(&[px[0], px[1], px[2], 0xFF]);
            }
        }
        ColorType::RGBA(8) => {
            data.extend_from_slice(&samples[..samples.len().min(pixel_count * 4)]);
        }
        other => {
            return Err(StreamError::UnsupportedFormat(format!(
                "{}: {:?}",
                path.display(),
                other
            )));
        }
    }

    if data.len() != pixel_count * 4 {
        return Err(StreamError::DecodeError(format!(
            "{}: truncated image data",
            path.display()
        )));
    }

    Ok(RgbaImage { width, height, data })
}
