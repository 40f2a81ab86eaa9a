use thiserror::Error;

/// Failures while pulling the current image out of a capture source.
///
/// Every variant skips the tick it happens in; none of them stop the stream.
#[derive(Error, Debug)]
pub enum SamplerError {
    #[error("Capture source has no current frame")]
    SourceUnavailable,

    #[error("Source image buffer too small for {width}x{height}: expected {expected} bytes, got {actual}")]
    InvalidSourceBuffer {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },

    #[error("Failed to resize frame: {0}")]
    ResizeError(String),
}

/// Failures of a single `Transport::send`.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Failed to connect to {url}: {reason}")]
    Connect { url: String, reason: String },

    #[error("Send queue full, frame dropped")]
    Saturated,

    #[error("Connection closed")]
    Closed,

    #[error("Frame of {actual} bytes exceeds transport limit of {limit} bytes")]
    FrameTooLarge { actual: usize, limit: usize },
}

#[derive(Error, Debug)]
pub enum ReceiverError {
    #[error("Invalid panel dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },

    #[error("Failed to accept client: {0}")]
    Accept(std::io::Error),

    #[error("Failed to display frame: {0}")]
    Display(String),
}

#[derive(Error, Debug)]
pub enum StreamError {
    #[error("Invalid frame dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Buffer dimensions differ: frame is {frame_width}x{frame_height}, target is {target_width}x{target_height}")]
    DimensionMismatch {
        frame_width: usize,
        frame_height: usize,
        target_width: usize,
        target_height: usize,
    },

    #[error("Failed to decode TIFF image: {0}")]
    DecodeError(String),

    #[error("Failed to encode TIFF image: {0}")]
    EncodeError(String),

    #[error("Unsupported source format: {0}")]
    UnsupportedFormat(String),

    #[error("No frames found in {0}")]
    EmptySequence(String),

    #[error(transparent)]
    Sampler(#[from] SamplerError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Receiver(#[from] ReceiverError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
