//! Remote display module
//!
//! The receiving end of the stream: a WebSocket endpoint that accepts one
//! client at a time and shows every full-size RGB565 frame it is sent.

mod config;
mod display;
mod server;

pub use config::{ReceiverConfig, ReceiverConfigBuilder};
pub use display::{FrameDisplay, TiffFrameDisplay};
pub use server::{FrameReceiver, ReceiverStats};
