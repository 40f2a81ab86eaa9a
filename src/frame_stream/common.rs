//! Common utilities module
//!
//! Error types and TIFF helpers shared by the capture, preview and receiver sides.

pub mod error;
pub mod shutdown;
pub mod tiff_io;

pub use error::{ReceiverError, Result, SamplerError, StreamError, TransportError};
