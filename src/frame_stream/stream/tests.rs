#[cfg(test)]
mod tests {
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::sync::watch;
    use tokio::time::{Instant, sleep};

    use crate::frame_stream::capture::{CaptureSource, PlaybackControl, SourceImage};
    use crate::frame_stream::common::error::{SamplerError, StreamError, TransportError};
    use crate::frame_stream::pixel::{QuantizedPreview, unpack_pixel};
    use crate::frame_stream::preview::PreviewSurface;
    use crate::frame_stream::stream::config::{PacingPolicy, StreamConfig};
    use crate::frame_stream::stream::stream_loop::{StreamLoop, StreamState, TickOutcome};
    use crate::frame_stream::transport::Transport;

    struct MockSource {
        control: PlaybackControl,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        calls: usize,
        unavailable_on: HashSet<usize>,
        pause_after: Option<usize>,
    }

    impl MockSource {
        fn solid(width: u32, height: u32, color: [u8; 4]) -> Self {
            Self {
                control: PlaybackControl::new(),
                width,
                height,
                rgba: color.repeat((width * height) as usize),
                calls: 0,
                unavailable_on: HashSet::new(),
                pause_after: None,
            }
        }

        /// Each pixel gets a distinct color derived from its index.
        fn gradient(width: u32, height: u32) -> Self {
            let mut source = Self::solid(width, height, [0; 4]);
            for (i, px) in source.rgba.chunks_exact_mut(4).enumerate() {
                px.copy_from_slice(&[(i * 7) as u8, (i * 13) as u8, (i * 31) as u8, 0xFF]);
            }
            source
        }

        fn playing(self) -> Self {
            self.control.play();
            self
        }
    }

    impl CaptureSource for MockSource {
        fn playback(&self) -> &PlaybackControl {
            &self.control
        }

        fn current_image(&mut self) -> Result<SourceImage<'_>, SamplerError> {
            self.calls += 1;
            if self.pause_after == Some(self.calls) {
                self.pause_after = None;
                self.control.pause();
            }
            if self.unavailable_on.contains(&self.calls) {
                return Err(SamplerError::SourceUnavailable);
            }
            Ok(SourceImage {
                width: self.width,
                height: self.height,
                rgba: &self.rgba,
            })
        }
    }

    #[derive(Clone, Default)]
    struct MockTransport {
        sent: Arc<Mutex<Vec<(Instant, Vec<u8>)>>>,
        calls: usize,
        fail_on: HashSet<usize>,
    }

    impl Transport for MockTransport {
        fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
            self.calls += 1;
            if self.fail_on.contains(&self.calls) {
                return Err(TransportError::Saturated);
            }
            self.sent.lock().unwrap().push((Instant::now(), bytes.to_vec()));
            Ok(())
        }
    }

    #[derive(Clone, Default)]
    struct MockPreview {
        renders: Arc<Mutex<Vec<(Vec<u8>, u32, u32)>>>,
    }

    impl PreviewSurface for MockPreview {
        fn render(&mut self, pixels: &QuantizedPreview, origin_x: u32, origin_y: u32) {
            self.renders
                .lock()
                .unwrap()
                .push((pixels.as_bytes().to_vec(), origin_x, origin_y));
        }
    }

    fn stream_with(
        source: MockSource,
        config: StreamConfig,
    ) -> (StreamLoop<MockSource, MockTransport, MockPreview>, MockTransport, MockPreview) {
        let transport = MockTransport::default();
        let preview = MockPreview::default();
        let stream = StreamLoop::new(source, transport.clone(), preview.clone(), config).unwrap();
        (stream, transport, preview)
    }

    #[test]
    fn test_white_frame_packs_to_all_ones() {
        let source = MockSource::solid(160, 128, [0xFF; 4]).playing();
        let (mut stream, transport, preview) = stream_with(source, StreamConfig::default());

        stream.start();
        assert_eq!(stream.tick(), TickOutcome::Sent);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].1.len(), 40_960);
        assert!(sent[0].1.iter().all(|&b| b == 0xFF));

        let renders = preview.renders.lock().unwrap();
        assert_eq!(renders.len(), 1);
        assert!(
            renders[0]
                .0
                .chunks_exact(4)
                .all(|px| px == [0xF8, 0xFC, 0xF8, 0x00])
        );
    }

    #[test]
    fn test_large_source_is_downscaled_to_panel() {
        let source = MockSource::solid(640, 480, [0xFF; 4]).playing();
        let (mut stream, transport, _preview) = stream_with(source, StreamConfig::default());

        stream.start();
        assert_eq!(stream.tick(), TickOutcome::Sent);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent[0].1.len(), 2 * 160 * 128);
        assert!(sent[0].1.iter().all(|&b| b == 0xFF));
    }

    #[test]
    fn test_preview_and_payload_agree() {
        let source = MockSource::gradient(160, 128).playing();
        let (mut stream, _transport, _preview) = stream_with(source, StreamConfig::default());

        stream.start();
        stream.tick();

        let payload = stream.packed().as_bytes();
        let preview = stream.quantized_preview();
        assert_eq!(payload.len(), 2 * preview.pixel_count());

        for (wire, quantized) in payload.chunks_exact(2).zip(preview.as_bytes().chunks_exact(4)) {
            assert_eq!(unpack_pixel([wire[0], wire[1]]), [quantized[0], quantized[1], quantized[2]]);
            assert_eq!(quantized[3], 0);
        }
    }

    #[test]
    fn test_unavailable_frame_skips_send_and_preview() {
        let mut source = MockSource::solid(160, 128, [0x10; 4]).playing();
        source.unavailable_on.insert(2);
        let (mut stream, transport, preview) = stream_with(source, StreamConfig::default());

        stream.start();
        assert_eq!(stream.tick(), TickOutcome::Sent);
        assert_eq!(stream.tick(), TickOutcome::Skipped);
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        assert_eq!(preview.renders.lock().unwrap().len(), 1);

        // transient: the next tick streams again
        assert_eq!(stream.tick(), TickOutcome::Sent);
        assert_eq!(stream.state(), StreamState::Running);
        assert_eq!(stream.stats().skipped, 1);
        assert_eq!(stream.stats().sent, 2);
    }

    #[test]
    fn test_inactive_source_goes_idle_without_work() {
        let source = MockSource::solid(160, 128, [0; 4]);
        let (mut stream, transport, preview) = stream_with(source, StreamConfig::default());

        stream.start();
        assert_eq!(stream.tick(), TickOutcome::Stopped);
        assert_eq!(stream.state(), StreamState::Idle);
        assert_eq!(stream.source().calls, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
        assert!(preview.renders.lock().unwrap().is_empty());
        assert_eq!(stream.stats().idle_transitions, 1);

        // idle until started again
        stream.source().control.play();
        assert_eq!(stream.tick(), TickOutcome::Stopped);
        stream.start();
        assert_eq!(stream.tick(), TickOutcome::Sent);
    }

    #[test]
    fn test_send_failure_reported_and_stream_continues() {
        let source = MockSource::solid(160, 128, [0x80; 4]).playing();
        let transport = MockTransport {
            fail_on: [1].into_iter().collect(),
            ..Default::default()
        };
        let preview = MockPreview::default();
        let failures = Arc::new(AtomicUsize::new(0));
        let counter = failures.clone();

        let mut stream = StreamLoop::new(source, transport.clone(), preview.clone(), StreamConfig::default())
            .unwrap()
            .with_send_failure_callback(Arc::new(move |e: &TransportError| {
                assert!(matches!(e, TransportError::Saturated));
                counter.fetch_add(1, Ordering::SeqCst);
            }));

        stream.start();
        assert_eq!(stream.tick(), TickOutcome::SendFailed);
        assert_eq!(stream.tick(), TickOutcome::Sent);

        assert_eq!(failures.load(Ordering::SeqCst), 1);
        // the dropped frame is not retried
        assert_eq!(transport.sent.lock().unwrap().len(), 1);
        // the preview is still mirrored for the dropped frame
        assert_eq!(preview.renders.lock().unwrap().len(), 2);
        assert_eq!(stream.stats().send_failures, 1);
    }

    #[test]
    fn test_preview_origin_forwarded() {
        let source = MockSource::solid(4, 4, [0; 4]).playing();
        let config = StreamConfig::builder()
            .dimensions(4, 4)
            .preview_origin(10, 20)
            .build();
        let (mut stream, _transport, preview) = stream_with(source, config);

        stream.start();
        stream.tick();

        let renders = preview.renders.lock().unwrap();
        assert_eq!((renders[0].1, renders[0].2), (10, 20));
    }

    #[test]
    fn test_config_builder() {
        let config = StreamConfig::builder()
            .dimensions(320, 240)
            .tick_interval(Duration::from_millis(20))
            .pacing(PacingPolicy::FixedRate)
            .build();

        assert_eq!((config.width, config.height), (320, 240));
        assert_eq!(config.tick_interval, Duration::from_millis(20));
        assert_eq!(config.pacing, PacingPolicy::FixedRate);
        assert_eq!(config.packed_len(), 153_600);

        let default = StreamConfig::default();
        assert_eq!((default.width, default.height), (160, 128));
        assert_eq!(default.tick_interval, Duration::from_millis(50));
        assert_eq!(default.pacing, PacingPolicy::FixedDelay);
    }

    #[test]
    fn test_zero_dimensions_rejected() {
        let config = StreamConfig::builder().dimensions(0, 128).build();
        let result = StreamLoop::new(
            MockSource::solid(1, 1, [0; 4]),
            MockTransport::default(),
            MockPreview::default(),
            config,
        );
        assert!(matches!(result, Err(StreamError::InvalidDimensions(0, 128))));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_dimensions_beyond_u32_rejected() {
        let too_wide = u32::MAX as usize + 1;
        let config = StreamConfig::builder().dimensions(too_wide, 1).build();
        let result = StreamLoop::new(
            MockSource::solid(1, 1, [0; 4]),
            MockTransport::default(),
            MockPreview::default(),
            config,
        );
        assert!(matches!(result, Err(StreamError::InvalidDimensions(w, 1)) if w == too_wide));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_idles_on_pause_and_resumes_on_play() {
        let mut source = MockSource::solid(160, 128, [0x40; 4]);
        source.pause_after = Some(3);
        let control = source.control.clone();
        let (stream, transport, _preview) = stream_with(source, StreamConfig::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        control.play();
        let handle = tokio::spawn(async move {
            let mut stream = stream;
            let stats = stream.run(shutdown_rx).await;
            (stream, stats)
        });

        sleep(Duration::from_millis(500)).await;
        assert_eq!(transport.sent.lock().unwrap().len(), 3);

        control.play();
        sleep(Duration::from_millis(120)).await;
        shutdown_tx.send(true).unwrap();

        let (stream, stats) = handle.await.unwrap();
        assert_eq!(stream.state(), StreamState::Idle);
        assert!(stats.sent > 3);
        assert_eq!(stats.sent as usize, transport.sent.lock().unwrap().len());
        assert_eq!(stats.idle_transitions, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_start_signal_does_not_leave_idle() {
        let source = MockSource::solid(160, 128, [0x40; 4]);
        let control = source.control.clone();
        let (stream, transport, _preview) = stream_with(source, StreamConfig::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        control.play();
        let handle = tokio::spawn(async move {
            let mut stream = stream;
            let stats = stream.run(shutdown_rx).await;
            (stream, stats)
        });

        sleep(Duration::from_millis(120)).await;
        control.play();
        control.pause();

        sleep(Duration::from_millis(180)).await;
        control.play();
        control.pause();

        sleep(Duration::from_millis(200)).await;
        shutdown_tx.send(true).unwrap();

        let (stream, stats) = handle.await.unwrap();
        assert_eq!(stream.state(), StreamState::Idle);
        assert_eq!(stats.sent, 3);
        assert_eq!(stats.ticks, 3);
        assert_eq!(stats.idle_transitions, 1);
        assert_eq!(transport.sent.lock().unwrap().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_delay_waits_after_each_tick() {
        let source = MockSource::solid(160, 128, [0; 4]).playing();
        let (stream, transport, _preview) = stream_with(source, StreamConfig::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut stream = stream;
            stream.run(shutdown_rx).await
        });

        sleep(Duration::from_millis(260)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert!(sent.len() >= 4);
        for pair in sent.windows(2) {
            assert!(pair[1].0 - pair[0].0 >= Duration::from_millis(50));
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_rate_ticks_on_period() {
        let source = MockSource::solid(160, 128, [0; 4]).playing();
        let config = StreamConfig::builder().pacing(PacingPolicy::FixedRate).build();
        let (stream, transport, _preview) = stream_with(source, config);

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut stream = stream;
            stream.run(shutdown_rx).await
        });

        sleep(Duration::from_millis(230)).await;
        shutdown_tx.send(true).unwrap();
        handle.await.unwrap();

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 5);
        let start = sent[0].0;
        for (i, (at, _)) in sent.iter().enumerate() {
            assert_eq!(*at - start, Duration::from_millis(50) * i as u32);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_while_idle() {
        let source = MockSource::solid(160, 128, [0; 4]);
        let (mut stream, transport, _preview) = stream_with(source, StreamConfig::default());

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        shutdown_tx.send(true).unwrap();
        let stats = stream.run(shutdown_rx).await;

        assert_eq!(stats.ticks, 0);
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
