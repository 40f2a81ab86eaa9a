use fast_image_resize as fr;
use fr::images::{Image, ImageRef};
use tracing::trace;

use crate::frame_stream::capture::source::CaptureSource;
use crate::frame_stream::common::error::SamplerError;
use crate::frame_stream::pixel::types::{Frame, RGBA_BYTES};

/// Draws a source's current image onto a fixed-size RGBA canvas.
///
/// Source images are stretched to exactly the frame dimensions with a
/// bilinear filter; a source already at frame size is copied as is.
pub struct FrameSampler {
    width: u32,
    height: u32,
    resizer: fr::Resizer,
    options: fr::ResizeOptions,
}

impl FrameSampler {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            resizer: fr::Resizer::new(),
            options: fr::ResizeOptions::new()
                .resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear))
                .use_alpha(false),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Overwrites `frame` with the source's current image.
    ///
    /// `frame` is left untouched on error.
    pub fn sample<S: CaptureSource + ?Sized>(
        &mut self,
        source: &mut S,
        frame: &mut Frame,
    ) -> Result<(), SamplerError> {
        if (frame.width, frame.height) != (self.width as usize, self.height as usize) {
            return Err(SamplerError::ResizeError(format!(
                "frame is {}x{}, sampler draws {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }

        let image = source.current_image()?;

        let expected = image.width as usize * image.height as usize * RGBA_BYTES;
        if image.width == 0 || image.height == 0 || image.rgba.len() < expected {
            return Err(SamplerError::InvalidSourceBuffer {
                width: image.width,
                height: image.height,
                expected,
                actual: image.rgba.len(),
            });
        }
        let pixels = &image.rgba[..expected];

        if (image.width, image.height) == (self.width, self.height) {
            frame.as_bytes_mut().copy_from_slice(pixels);
            return Ok(());
        }

        trace!(
            "Resampling {}x{} -> {}x{}",
            image.width, image.height, self.width, self.height
        );

        let src = ImageRef::new(image.width, image.height, pixels, fr::PixelType::U8x4)
            .map_err(|e| SamplerError::ResizeError(e.to_string()))?;
        let mut dst = Image::from_slice_u8(
            self.width,
            self.height,
            frame.as_bytes_mut(),
            fr::PixelType::U8x4,
        )
        .map_err(|e| SamplerError::ResizeError(e.to_string()))?;

        self.resizer
            .resize(&src, &mut dst, &self.options)
            .map_err(|e| SamplerError::ResizeError(e.to_string()))?;

        Ok(())
    }
}
