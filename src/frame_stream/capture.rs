//! Frame capture module
//!
//! Capture sources expose their current image at native resolution; the
//! sampler scales that image onto the fixed-size frame the stream packs.

mod sampler;
mod source;
mod test_pattern;
mod tiff_sequence;

pub use sampler::FrameSampler;
pub use source::{CaptureSource, PlaybackControl, PlaybackState, SourceImage};
pub use test_pattern::TestPatternSource;
pub use tiff_sequence::TiffSequenceSource;
