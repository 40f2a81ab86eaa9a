use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::frame_stream::capture::source::{CaptureSource, PlaybackControl, SourceImage};
use crate::frame_stream::common::error::{Result, SamplerError, StreamError};
use crate::frame_stream::common::tiff_io::{RgbaImage, read_rgba8};

/// Plays a directory of TIFF images in file-name order, one image per
/// sample.
///
/// Without looping the source ends after the last image, which stops the
/// stream the same way a finished video would.
pub struct TiffSequenceSource {
    control: PlaybackControl,
    frames: Vec<RgbaImage>,
    next: usize,
    looping: bool,
}

fn is_tiff(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("tif") || ext.eq_ignore_ascii_case("tiff"))
}

impl TiffSequenceSource {
    pub fn open<P: AsRef<Path>>(dir: P, looping: bool) -> Result<Self> {
        let dir = dir.as_ref();

        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_file() && is_tiff(path))
            .collect();
        paths.sort();

        if paths.is_empty() {
            return Err(StreamError::EmptySequence(dir.display().to_string()));
        }

        let frames = paths
            .iter()
            .map(|path| {
                debug!("Loading {}", path.display());
                read_rgba8(path)
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Loaded {} frames from {} (looping: {})",
            frames.len(),
            dir.display(),
            looping
        );

        Ok(Self {
            control: PlaybackControl::new(),
            frames,
            next: 0,
            looping,
        })
    }

    pub fn control(&self) -> PlaybackControl {
        self.control.clone()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl CaptureSource for TiffSequenceSource {
    fn playback(&self) -> &PlaybackControl {
        &self.control
    }

    fn current_image(&mut self) -> std::result::Result<SourceImage<'_>, SamplerError> {
        if self.next >= self.frames.len() {
            if !self.looping || self.frames.is_empty() {
                self.control.end();
                return Err(SamplerError::SourceUnavailable);
            }
            self.next = 0;
        }

        let index = self.next;
        self.next += 1;

        let frame = &self.frames[index];
        Ok(SourceImage {
            width: frame.width,
            height: frame.height,
            rgba: &frame.data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame_stream::capture::source::PlaybackState;
    use crate::frame_stream::common::tiff_io::write_rgb8_atomic;

    fn write_solid(dir: &Path, name: &str, value: u8) {
        write_rgb8_atomic(&dir.join(name), 2, 2, &[value; 12]).unwrap();
    }

    #[test]
    fn test_plays_in_name_order_then_ends() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "b.tiff", 20);
        write_solid(dir.path(), "a.tif", 10);
        std::fs::write(dir.path().join("notes.txt"), b"ignored").unwrap();

        let mut source = TiffSequenceSource::open(dir.path(), false).unwrap();
        let control = source.control();
        control.play();
        assert_eq!(source.len(), 2);

        assert_eq!(source.current_image().unwrap().rgba[0], 10);
        assert_eq!(source.current_image().unwrap().rgba[0], 20);
        assert!(matches!(
            source.current_image(),
            Err(SamplerError::SourceUnavailable)
        ));
        assert_eq!(control.state(), PlaybackState::Ended);
    }

    #[test]
    fn test_looping_wraps_around() {
        let dir = tempfile::tempdir().unwrap();
        write_solid(dir.path(), "only.tiff", 42);

        let mut source = TiffSequenceSource::open(dir.path(), true).unwrap();
        for _ in 0..3 {
            let image = source.current_image().unwrap();
            assert_eq!((image.width, image.height), (2, 2));
            assert_eq!(image.rgba[3], 0xFF);
        }
    }

    #[test]
    fn test_empty_directory_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            TiffSequenceSource::open(dir.path(), true),
            Err(StreamError::EmptySequence(_))
        ));
    }
}
