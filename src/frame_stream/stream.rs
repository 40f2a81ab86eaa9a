//! Stream loop module
//!
//! Drives capture, packing, transmission and preview once per tick.

mod config;
mod stats;
mod stream_loop;
mod timing;

#[cfg(test)]
mod tests;

pub use config::{PacingPolicy, StreamConfig, StreamConfigBuilder};
pub use stats::StreamStats;
pub use stream_loop::{SendFailureCallback, StreamLoop, StreamState, TickOutcome};
pub use timing::{Stage, StageTimer, TickTimings};
