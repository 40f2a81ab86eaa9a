use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

use tokio::sync::Notify;

use crate::frame_stream::common::error::SamplerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Playing,
    Paused,
    Ended,
}

impl PlaybackState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => PlaybackState::Playing,
            1 => PlaybackState::Paused,
            _ => PlaybackState::Ended,
        }
    }

    fn as_u8(self) -> u8 {
        match self {
            PlaybackState::Playing => 0,
            PlaybackState::Paused => 1,
            PlaybackState::Ended => 2,
        }
    }
}

#[derive(Debug)]
struct PlaybackInner {
    state: AtomicU8,
    started: Notify,
}

/// Shared play/pause/end switch for a capture source.
///
/// Clones refer to the same state, so a UI or signal handler can drive a
/// source that the stream loop owns. Starting playback from a paused or
/// ended state stores a wake-up permit even when nobody is waiting yet, so
/// a start signal is never lost. `play` while already playing is a no-op.
#[derive(Debug, Clone)]
pub struct PlaybackControl {
    inner: Arc<PlaybackInner>,
}

impl Default for PlaybackControl {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackControl {
    /// New control in the paused state.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(PlaybackInner {
                state: AtomicU8::new(PlaybackState::Paused.as_u8()),
                started: Notify::new(),
            }),
        }
    }

    pub fn play(&self) {
        let previous = self
            .inner
            .state
            .swap(PlaybackState::Playing.as_u8(), Ordering::AcqRel);
        if PlaybackState::from_u8(previous) != PlaybackState::Playing {
            self.inner.started.notify_one();
        }
    }

    pub fn pause(&self) {
        self.set(PlaybackState::Paused);
    }

    pub fn end(&self) {
        self.set(PlaybackState::Ended);
    }

    pub fn state(&self) -> PlaybackState {
        PlaybackState::from_u8(self.inner.state.load(Ordering::Acquire))
    }

    pub fn is_active(&self) -> bool {
        self.state() == PlaybackState::Playing
    }

    /// Resolves once `play` has been called since the last wake-up.
    pub async fn playback_started(&self) {
        self.inner.started.notified().await;
    }

    fn set(&self, state: PlaybackState) {
        self.inner.state.store(state.as_u8(), Ordering::Release);
    }
}

/// Borrowed view of a source's current image, RGBA8 row-major.
#[derive(Debug, Clone, Copy)]
pub struct SourceImage<'a> {
    pub width: u32,
    pub height: u32,
    pub rgba: &'a [u8],
}

/// A video source the stream samples from.
pub trait CaptureSource: Send {
    /// Play/pause/end state shared with whoever drives playback.
    fn playback(&self) -> &PlaybackControl;

    /// The image currently on screen, or `SourceUnavailable` when there is
    /// none (stream ended, nothing decoded yet).
    fn current_image(&mut self) -> Result<SourceImage<'_>, SamplerError>;

    fn is_active(&self) -> bool {
        self.playback().is_active()
    }
}

impl<S: CaptureSource + ?Sized> CaptureSource for Box<S> {
    fn playback(&self) -> &PlaybackControl {
        (**self).playback()
    }

    fn current_image(&mut self) -> Result<SourceImage<'_>, SamplerError> {
        (**self).current_image()
    }

    fn is_active(&self) -> bool {
        (**self).is_active()
    }
}
