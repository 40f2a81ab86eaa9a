use std::path::{Path, PathBuf};

use crate::frame_stream::common::error::{Result, StreamError};
use crate::frame_stream::common::tiff_io::write_rgb8_atomic;
use crate::frame_stream::pixel::unpack_frame;

/// Sink for received RGB565 frames.
pub trait FrameDisplay: Send {
    fn show(&mut self, rgb565: &[u8]) -> Result<()>;
}

/// Expands each frame to RGB8 and writes it to a TIFF file, replacing the
/// previous one.
pub struct TiffFrameDisplay {
    path: PathBuf,
    width: usize,
    height: usize,
    rgb: Vec<u8>,
}

impl TiffFrameDisplay {
    pub fn new<P: AsRef<Path>>(path: P, width: usize, height: usize) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StreamError::InvalidDimensions(width, height));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            rgb: vec![0; width * height * 3],
        })
    }
}

impl FrameDisplay for TiffFrameDisplay {
    fn show(&mut self, rgb565: &[u8]) -> Result<()> {
        unpack_frame(rgb565, &mut self.rgb)?;
        write_rgb8_atomic(&self.path, self.width as u32, self.height as u32, &self.rgb)
    }
}
