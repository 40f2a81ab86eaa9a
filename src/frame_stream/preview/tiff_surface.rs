use std::path::{Path, PathBuf};

use tracing::warn;

use crate::frame_stream::common::error::{Result, StreamError};
use crate::frame_stream::common::tiff_io::write_rgb8_atomic;
use crate::frame_stream::pixel::types::{QuantizedPreview, RGBA_BYTES};
use crate::frame_stream::preview::PreviewSurface;

/// Preview surface backed by a TIFF snapshot on disk.
///
/// Keeps an RGB canvas, blits each preview at its origin (clipped to the
/// canvas) and rewrites the file. Alpha is dropped since the quantized
/// preview always carries zero alpha.
pub struct TiffPreviewSurface {
    path: PathBuf,
    width: u32,
    height: u32,
    canvas: Vec<u8>,
    renders: u64,
}

impl TiffPreviewSurface {
    pub fn new<P: AsRef<Path>>(path: P, width: u32, height: u32) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(StreamError::InvalidDimensions(width as usize, height as usize));
        }
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            width,
            height,
            canvas: vec![0; width as usize * height as usize * 3],
            renders: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    fn blit(&mut self, pixels: &QuantizedPreview, origin_x: u32, origin_y: u32) {
        let canvas_w = self.width as usize;
        let canvas_h = self.height as usize;
        let (ox, oy) = (origin_x as usize, origin_y as usize);
        if ox >= canvas_w || oy >= canvas_h {
            return;
        }

        let cols = pixels.width.min(canvas_w - ox);
        let rows = pixels.height.min(canvas_h - oy);

        for y in 0..rows {
            let src_row = &pixels.as_bytes()[y * pixels.width * RGBA_BYTES..][..cols * RGBA_BYTES];
            let dst_row = &mut self.canvas[((oy + y) * canvas_w + ox) * 3..][..cols * 3];
            for (src, dst) in src_row.chunks_exact(RGBA_BYTES).zip(dst_row.chunks_exact_mut(3)) {
                dst.copy_from_slice(&src[..3]);
            }
        }
    }
}

impl PreviewSurface for TiffPreviewSurface {
    fn render(&mut self, pixels: &QuantizedPreview, origin_x: u32, origin_y: u32) {
        self.blit(pixels, origin_x, origin_y);
        match write_rgb8_atomic(&self.path, self.width, self.height, &self.canvas) {
            Ok(()) => self.renders += 1,
            Err(e) => warn!("Preview write to {} failed: {}", self.path.display(), e),
        }
    }
}
