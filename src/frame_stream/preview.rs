//! Local preview module

mod tiff_surface;

pub use tiff_surface::TiffPreviewSurface;

use crate::frame_stream::pixel::types::QuantizedPreview;

/// Where the quantized preview is mirrored locally.
///
/// Rendering is fire-and-forget: implementations log their own failures.
pub trait PreviewSurface: Send {
    fn render(&mut self, pixels: &QuantizedPreview, origin_x: u32, origin_y: u32);
}

/// Discards every preview.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPreview;

impl PreviewSurface for NullPreview {
    fn render(&mut self, _pixels: &QuantizedPreview, _origin_x: u32, _origin_y: u32) {}
}

impl<P: PreviewSurface + ?Sized> PreviewSurface for Box<P> {
    fn render(&mut self, pixels: &QuantizedPreview, origin_x: u32, origin_y: u32) {
        (**self).render(pixels, origin_x, origin_y)
    }
}
