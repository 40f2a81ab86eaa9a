//! Transport module
//!
//! The stream only needs a non-blocking `send` against an already-open,
//! ordered byte channel. Connection setup belongs to the implementation.

mod websocket;

pub use websocket::WebSocketTransport;

use crate::frame_stream::common::error::TransportError;

pub trait Transport: Send {
    /// Hands one packed frame to the channel without waiting on the network.
    ///
    /// Delivery is at most once: a failed frame is never retried.
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}
