//! Frame streaming module
//!
//! Samples a capture source, packs each frame to RGB565 and pushes it to a
//! remote panel while mirroring the quantized image locally. The receiver
//! side implements the panel end of the same wire format.

pub mod capture;
pub mod common;
pub mod pixel;
pub mod preview;
pub mod receiver;
pub mod stream;
pub mod transport;

pub use common::{ReceiverError, Result, SamplerError, StreamError, TransportError};

pub use pixel::{
    Frame,
    PackedBuffer,
    PackedPixel,
    QuantizedPreview,
    pack_frame,
    pack_pixel,
    unpack_frame,
    unpack_pixel,
};

pub use capture::{
    CaptureSource,
    FrameSampler,
    PlaybackControl,
    PlaybackState,
    SourceImage,
    TestPatternSource,
    TiffSequenceSource,
};

pub use transport::{Transport, WebSocketTransport};

pub use preview::{NullPreview, PreviewSurface, TiffPreviewSurface};

pub use stream::{
    PacingPolicy,
    StreamConfig,
    StreamConfigBuilder,
    StreamLoop,
    StreamState,
    StreamStats,
    TickOutcome,
};

pub use receiver::{FrameDisplay, FrameReceiver, ReceiverConfig, ReceiverStats, TiffFrameDisplay};
