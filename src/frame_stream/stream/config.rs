//! Stream configuration types

use std::time::Duration;

/// How the next tick is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacingPolicy {
    /// Wait `tick_interval` after the previous tick finished. The effective
    /// period grows with capture and send time.
    FixedDelay,
    /// Tick every `tick_interval` measured from stream start; ticks missed
    /// under load are skipped rather than bunched up.
    FixedRate,
}

/// Configuration for a frame stream
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Frame width in pixels (panel width)
    pub width: usize,
    /// Frame height in pixels (panel height)
    pub height: usize,
    /// Delay or period between ticks, depending on `pacing`
    pub tick_interval: Duration,
    pub pacing: PacingPolicy,
    /// Where the preview is drawn on the local surface
    pub preview_origin: (u32, u32),
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            width: 160,
            height: 128,
            tick_interval: Duration::from_millis(50),
            pacing: PacingPolicy::FixedDelay,
            preview_origin: (0, 0),
        }
    }
}

impl StreamConfig {
    pub fn builder() -> StreamConfigBuilder {
        StreamConfigBuilder::default()
    }

    /// Bytes in every transmitted message.
    pub fn packed_len(&self) -> usize {
        self.width * self.height * 2
    }
}

/// Builder for StreamConfig
#[derive(Default)]
pub struct StreamConfigBuilder {
    dimensions: Option<(usize, usize)>,
    tick_interval: Option<Duration>,
    pacing: Option<PacingPolicy>,
    preview_origin: Option<(u32, u32)>,
}

impl StreamConfigBuilder {
    pub fn dimensions(mut self, width: usize, height: usize) -> Self {
        self.dimensions = Some((width, height));
        self
    }

    pub fn tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval = Some(interval);
        self
    }

    pub fn pacing(mut self, pacing: PacingPolicy) -> Self {
        self.pacing = Some(pacing);
        self
    }

    pub fn preview_origin(mut self, x: u32, y: u32) -> Self {
        self.preview_origin = Some((x, y));
        self
    }

    pub fn build(self) -> StreamConfig {
        let default = StreamConfig::default();
        let (width, height) = self.dimensions.unwrap_or((default.width, default.height));
        StreamConfig {
            width,
            height,
            tick_interval: self.tick_interval.unwrap_or(default.tick_interval),
            pacing: self.pacing.unwrap_or(default.pacing),
            preview_origin: self.preview_origin.unwrap_or(default.preview_origin),
        }
    }
}
