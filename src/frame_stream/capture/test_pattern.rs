use crate::frame_stream::capture::source::{CaptureSource, PlaybackControl, PlaybackState, SourceImage};
use crate::frame_stream::common::error::SamplerError;

const BARS: [[u8; 4]; 8] = [
    [0xFF, 0xFF, 0xFF, 0xFF],
    [0xFF, 0xFF, 0x00, 0xFF],
    [0x00, 0xFF, 0xFF, 0xFF],
    [0x00, 0xFF, 0x00, 0xFF],
    [0xFF, 0x00, 0xFF, 0xFF],
    [0xFF, 0x00, 0x00, 0xFF],
    [0x00, 0x00, 0xFF, 0xFF],
    [0x00, 0x00, 0x00, 0xFF],
];

/// Synthetic source: eight color bars scrolling one column per image.
pub struct TestPatternSource {
    control: PlaybackControl,
    width: u32,
    height: u32,
    offset: u32,
    rgba: Vec<u8>,
}

impl TestPatternSource {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            control: PlaybackControl::new(),
            width,
            height,
            offset: 0,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    /// Handle for starting and stopping playback from elsewhere.
    pub fn control(&self) -> PlaybackControl {
        self.control.clone()
    }

    fn render(&mut self) {
        let width = self.width.max(1) as usize;
        let row_len = width * 4;
        let Some((first_row, rest)) = self.rgba.split_at_mut_checked(row_len) else {
            return;
        };

        for (x, px) in first_row.chunks_exact_mut(4).enumerate() {
            let column = (x + self.offset as usize) % width;
            px.copy_from_slice(&BARS[column * BARS.len() / width]);
        }
        for row in rest.chunks_exact_mut(row_len) {
            row.copy_from_slice(first_row);
        }

        self.offset = (self.offset + 1) % self.width.max(1);
    }
}

impl CaptureSource for TestPatternSource {
    fn playback(&self) -> &PlaybackControl {
        &self.control
    }

    fn current_image(&mut self) -> Result<SourceImage<'_>, SamplerError> {
        if self.control.state() == PlaybackState::Ended || self.rgba.is_empty() {
            return Err(SamplerError::SourceUnavailable);
        }

        self.render();
        Ok(SourceImage {
            width: self.width,
            height: self.height,
            rgba: &self.rgba,
        })
    }
}
