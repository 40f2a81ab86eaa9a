use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tracing::{debug, debug_span, info, warn};

use crate::frame_stream::capture::{CaptureSource, FrameSampler};
use crate::frame_stream::common::error::{Result, SamplerError, StreamError, TransportError};
use crate::frame_stream::common::shutdown::shutdown_requested;
use crate::frame_stream::pixel::{Frame, PackedBuffer, QuantizedPreview, pack_frame};
use crate::frame_stream::preview::PreviewSurface;
use crate::frame_stream::stream::config::{PacingPolicy, StreamConfig};
use crate::frame_stream::stream::stats::StreamStats;
use crate::frame_stream::stream::timing::{Stage, StageTimer, TickTimings};
use crate::frame_stream::transport::Transport;

/// Called with every send failure, after it has been logged and counted.
pub type SendFailureCallback = Arc<dyn Fn(&TransportError) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamState {
    Idle,
    Running,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Frame packed, accepted by the transport and previewed
    Sent,
    /// Frame packed and previewed, but the transport refused it
    SendFailed,
    /// No frame could be sampled; nothing sent or previewed
    Skipped,
    /// Source paused or ended; the stream is idle
    Stopped,
}

/// Capture -> pack -> send -> preview driver.
///
/// Owns the frame, packed and preview buffers for the lifetime of the
/// stream; every tick overwrites them in place. Ticks never overlap, so the
/// buffers need no locking.
pub struct StreamLoop<S: CaptureSource, T: Transport, P: PreviewSurface> {
    source: S,
    transport: T,
    preview: P,
    config: StreamConfig,
    sampler: FrameSampler,
    frame: Frame,
    packed: PackedBuffer,
    quantized: QuantizedPreview,
    state: StreamState,
    stats: StreamStats,
    on_send_failure: Option<SendFailureCallback>,
}

/// Panel dimensions as the sampler sees them. Zero or anything past `u32`
/// is rejected.
fn panel_dimensions(config: &StreamConfig) -> Result<(u32, u32)> {
    let invalid = || StreamError::InvalidDimensions(config.width, config.height);
    let width = u32::try_from(config.width).map_err(|_| invalid())?;
    let height = u32::try_from(config.height).map_err(|_| invalid())?;
    if width == 0 || height == 0 {
        return Err(invalid());
    }
    Ok((width, height))
}

impl<S: CaptureSource, T: Transport, P: PreviewSurface> StreamLoop<S, T, P> {
    pub fn new(source: S, transport: T, preview: P, config: StreamConfig) -> Result<Self> {
        let (width, height) = panel_dimensions(&config)?;

        let frame = Frame::new(config.width, config.height)?;
        let packed = PackedBuffer::new(config.width, config.height)?;
        let quantized = QuantizedPreview::new(config.width, config.height)?;
        let sampler = FrameSampler::new(width, height);

        debug!(
            "Stream buffers allocated: {}x{}, {} bytes per frame",
            config.width,
            config.height,
            packed.len()
        );

        Ok(Self {
            source,
            transport,
            preview,
            config,
            sampler,
            frame,
            packed,
            quantized,
            state: StreamState::Idle,
            stats: StreamStats::default(),
            on_send_failure: None,
        })
    }

    pub fn with_send_failure_callback(mut self, callback: SendFailureCallback) -> Self {
        self.on_send_failure = Some(callback);
        self
    }

    pub fn state(&self) -> StreamState {
        self.state
    }

    pub fn stats(&self) -> StreamStats {
        self.stats
    }

    pub fn config(&self) -> &StreamConfig {
        &self.config
    }

    /// The payload of the last packed frame.
    pub fn packed(&self) -> &PackedBuffer {
        &self.packed
    }

    /// The quantized preview of the last packed frame.
    pub fn quantized_preview(&self) -> &QuantizedPreview {
        &self.quantized
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn preview(&self) -> &P {
        &self.preview
    }

    /// Consumes the loop, handing back its collaborators.
    pub fn into_parts(self) -> (S, T, P) {
        (self.source, self.transport, self.preview)
    }

    /// Idle -> Running. Called when the source signals playback start.
    pub fn start(&mut self) {
        if self.state == StreamState::Idle {
            info!("Playback started, streaming {}x{}", self.config.width, self.config.height);
            self.state = StreamState::Running;
        }
    }

    fn go_idle(&mut self) {
        if self.state == StreamState::Running {
            self.stats.idle_transitions += 1;
            info!(
                sent = self.stats.sent,
                skipped = self.stats.skipped,
                send_failures = self.stats.send_failures,
                "Source paused or ended, stream idle"
            );
        }
        self.state = StreamState::Idle;
    }

    /// Runs one tick to completion.
    ///
    /// The source is checked before any work, so a paused or ended source
    /// never costs a capture or a stale transmission.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state == StreamState::Idle {
            return TickOutcome::Stopped;
        }
        if !self.source.is_active() {
            self.go_idle();
            return TickOutcome::Stopped;
        }

        self.stats.ticks += 1;
        let _span = debug_span!("tick", n = self.stats.ticks).entered();
        let mut timings = TickTimings::new();

        let timer = StageTimer::start(Stage::Sample);
        let sampled = self.sampler.sample(&mut self.source, &mut self.frame);
        timings.record(timer.stop());

        if let Err(e) = sampled {
            match e {
                SamplerError::SourceUnavailable => debug!("No current frame, tick skipped"),
                other => warn!("Sampling failed, tick skipped: {}", other),
            }
            self.stats.skipped += 1;
            return TickOutcome::Skipped;
        }

        let timer = StageTimer::start(Stage::Pack);
        let packed = pack_frame(&self.frame, &mut self.packed, &mut self.quantized);
        timings.record(timer.stop());

        if let Err(e) = packed {
            warn!("Packing failed, tick skipped: {}", e);
            self.stats.skipped += 1;
            return TickOutcome::Skipped;
        }

        let timer = StageTimer::start(Stage::Send);
        let sent = self.transport.send(self.packed.as_bytes());
        timings.record(timer.stop());

        let outcome = match sent {
            Ok(()) => {
                self.stats.sent += 1;
                TickOutcome::Sent
            }
            Err(e) => {
                self.stats.send_failures += 1;
                warn!("Frame dropped: {}", e);
                if let Some(callback) = &self.on_send_failure {
                    callback(&e);
                }
                TickOutcome::SendFailed
            }
        };

        let timer = StageTimer::start(Stage::Preview);
        let (origin_x, origin_y) = self.config.preview_origin;
        self.preview.render(&self.quantized, origin_x, origin_y);
        timings.record(timer.stop());

        debug!("{}", timings);
        outcome
    }

    /// Ticks until the source stops or shutdown is requested.
    ///
    /// Returns `true` when it stopped because of shutdown.
    pub async fn run_until_idle(&mut self, shutdown: &mut watch::Receiver<bool>) -> bool {
        self.start();
        let period = self.config.tick_interval;

        let mut ticker = match self.config.pacing {
            PacingPolicy::FixedRate => {
                let mut ticker = interval(period);
                ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
                Some(ticker)
            }
            PacingPolicy::FixedDelay => None,
        };

        loop {
            if let Some(ticker) = ticker.as_mut() {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = shutdown_requested(shutdown) => return true,
                }
            }

            if self.tick() == TickOutcome::Stopped {
                return false;
            }

            if ticker.is_none() {
                tokio::select! {
                    _ = sleep(period) => {}
                    _ = shutdown_requested(shutdown) => return true,
                }
            }
        }
    }

    /// Streams across any number of play/pause cycles until shutdown.
    ///
    /// Waits idle for each playback-start signal, then ticks until the
    /// source stops. The in-flight tick always completes before this
    /// returns.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> StreamStats {
        loop {
            if self.state == StreamState::Idle {
                let playback = self.source.playback().clone();
                // A start signal that was overtaken by a pause does not count.
                let resumed = loop {
                    tokio::select! {
                        _ = playback.playback_started() => {
                            if self.source.is_active() {
                                break true;
                            }
                        }
                        _ = shutdown_requested(&mut shutdown) => break false,
                    }
                };
                if !resumed {
                    break;
                }
            }

            if self.run_until_idle(&mut shutdown).await {
                break;
            }
        }

        self.go_idle();
        info!(
            ticks = self.stats.ticks,
            sent = self.stats.sent,
            "Stream shut down"
        );
        self.stats
    }
}
