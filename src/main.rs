use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use lcd_stream_rs::frame_stream::{
    CaptureSource, FrameReceiver, NullPreview, PacingPolicy, PlaybackControl, PlaybackState,
    PreviewSurface, ReceiverConfig, StreamConfig, StreamLoop, TestPatternSource,
    TiffFrameDisplay, TiffPreviewSurface, TiffSequenceSource, WebSocketTransport,
};
use lcd_stream_rs::logger;
use tokio::sync::watch;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "lcd-stream", about = "Stream video frames to an RGB565 panel")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Sample a source and stream packed frames to a panel
    Send(SendArgs),
    /// Act as the panel: accept frames and write them to a TIFF file
    Receive(ReceiveArgs),
}

#[derive(Args)]
struct SendArgs {
    /// WebSocket endpoint of the panel
    #[arg(long, env = "LCD_STREAM_URL", default_value = "ws://192.168.4.1/video")]
    url: String,

    /// Directory of TIFF images to play instead of the test pattern
    #[arg(long)]
    source_dir: Option<PathBuf>,

    /// Restart the TIFF sequence after the last image
    #[arg(long = "loop")]
    looping: bool,

    /// Write the quantized preview to this TIFF file
    #[arg(long)]
    preview: Option<PathBuf>,

    #[arg(long, default_value_t = 0)]
    preview_x: u32,

    #[arg(long, default_value_t = 0)]
    preview_y: u32,

    #[arg(long, default_value_t = 160)]
    width: usize,

    #[arg(long, default_value_t = 128)]
    height: usize,

    /// Milliseconds between ticks
    #[arg(long, default_value_t = 50)]
    interval_ms: u64,

    /// Tick on a fixed period instead of a fixed delay after each tick
    #[arg(long)]
    fixed_rate: bool,

    /// Frames that may wait for the socket before new ones are dropped
    #[arg(long, default_value_t = 2)]
    queue_depth: usize,
}

#[derive(Args)]
struct ReceiveArgs {
    #[arg(long, env = "LCD_STREAM_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    #[arg(long, default_value = "/video")]
    resource: String,

    /// File the latest frame is written to
    #[arg(long, default_value = "panel.tiff")]
    output: PathBuf,

    #[arg(long, default_value_t = 160)]
    width: usize,

    #[arg(long, default_value_t = 128)]
    height: usize,
}

/// Publishes shutdown on Ctrl-C, or when `finished` resolves.
fn shutdown_on<F>(finished: F) -> watch::Receiver<bool>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        tokio::select! {
            interrupted = tokio::signal::ctrl_c() => match interrupted {
                Ok(()) => info!("Interrupted, shutting down"),
                Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
            },
            _ = finished => info!("Source finished, shutting down"),
        }
        let _ = shutdown_tx.send(true);
    });
    shutdown_rx
}

/// Panel dimensions as `u32`, with room for the source size and preview canvas.
fn panel_size(args: &SendArgs) -> anyhow::Result<(u32, u32)> {
    let width = u32::try_from(args.width).context("--width does not fit in u32")?;
    let height = u32::try_from(args.height).context("--height does not fit in u32")?;
    Ok((width, height))
}

async fn send(args: SendArgs) -> anyhow::Result<()> {
    let (width, height) = panel_size(&args)?;
    let config = StreamConfig::builder()
        .dimensions(args.width, args.height)
        .tick_interval(Duration::from_millis(args.interval_ms))
        .pacing(if args.fixed_rate {
            PacingPolicy::FixedRate
        } else {
            PacingPolicy::FixedDelay
        })
        .preview_origin(args.preview_x, args.preview_y)
        .build();

    let (source, control): (Box<dyn CaptureSource>, PlaybackControl) = match &args.source_dir {
        Some(dir) => {
            let source = TiffSequenceSource::open(dir, args.looping)
                .with_context(|| format!("loading frames from {}", dir.display()))?;
            let control = source.control();
            (Box::new(source) as Box<dyn CaptureSource>, control)
        }
        None => {
            let source_width = width.checked_mul(2).context("--width too large for test pattern")?;
            let source_height = height.checked_mul(2).context("--height too large for test pattern")?;
            let source = TestPatternSource::new(source_width, source_height);
            let control = source.control();
            (Box::new(source) as Box<dyn CaptureSource>, control)
        }
    };

    let preview: Box<dyn PreviewSurface> = match &args.preview {
        Some(path) => {
            let canvas_width = width
                .checked_add(args.preview_x)
                .context("--preview-x places the preview past u32::MAX")?;
            let canvas_height = height
                .checked_add(args.preview_y)
                .context("--preview-y places the preview past u32::MAX")?;
            Box::new(TiffPreviewSurface::new(path, canvas_width, canvas_height)?)
        }
        None => Box::new(NullPreview),
    };

    let transport = WebSocketTransport::connect_with_limit(
        &args.url,
        args.queue_depth,
        config.packed_len(),
    )
    .await?;

    let mut stream = StreamLoop::new(source, transport, preview, config)?;
    let ended = control.clone();
    let shutdown = shutdown_on(async move {
        while ended.state() != PlaybackState::Ended {
            tokio::time::sleep(Duration::from_millis(100)).await;
        }
    });

    control.play();
    let stats = stream.run(shutdown).await;
    info!(
        "Sent {} frames, skipped {}, dropped {}",
        stats.sent, stats.skipped, stats.send_failures
    );

    let (_source, transport, _preview) = stream.into_parts();
    transport.close().await;
    Ok(())
}

async fn receive(args: ReceiveArgs) -> anyhow::Result<()> {
    let config = ReceiverConfig::builder()
        .bind_addr(args.bind)
        .resource(args.resource)
        .dimensions(args.width, args.height)
        .build();

    let display = TiffFrameDisplay::new(&args.output, args.width, args.height)?;
    let receiver = FrameReceiver::bind(config).await?;
    let stats = receiver.serve(display, shutdown_on(std::future::pending())).await;

    info!(
        "Served {} clients, displayed {} frames",
        stats.clients, stats.frames
    );
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Send(args) => send(args).await,
        Command::Receive(args) => receive(args).await,
    }
}
