use std::net::SocketAddr;

use futures_util::StreamExt;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::watch;
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};
use tokio_tungstenite::tungstenite::http::StatusCode;
use tracing::{debug, info, warn};

use crate::frame_stream::common::error::ReceiverError;
use crate::frame_stream::common::shutdown::shutdown_requested;
use crate::frame_stream::receiver::config::ReceiverConfig;
use crate::frame_stream::receiver::display::FrameDisplay;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReceiverStats {
    /// Clients that completed the handshake
    pub clients: u64,
    /// Connections refused during the handshake
    pub rejected: u64,
    /// Frames handed to the display
    pub frames: u64,
    /// Binary messages of the wrong size
    pub ignored: u64,
}

/// WebSocket endpoint for the remote panel.
///
/// Clients are served one after another; a second client waits in the
/// listen backlog until the first disconnects.
pub struct FrameReceiver {
    listener: TcpListener,
    config: ReceiverConfig,
}

impl FrameReceiver {
    pub async fn bind(config: ReceiverConfig) -> Result<Self, ReceiverError> {
        if config.width == 0 || config.height == 0 || config.checked_frame_len().is_none() {
            return Err(ReceiverError::InvalidDimensions(config.width, config.height));
        }

        let listener = TcpListener::bind(config.bind_addr)
            .await
            .map_err(|source| ReceiverError::Bind {
                addr: config.bind_addr,
                source,
            })?;
        info!(
            "Listening on {} for {} ({} byte frames)",
            config.bind_addr,
            config.resource,
            config.frame_len()
        );
        Ok(Self { listener, config })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ReceiverConfig {
        &self.config
    }

    /// Accepts and serves clients until shutdown is requested.
    pub async fn serve<D: FrameDisplay>(
        self,
        mut display: D,
        mut shutdown: watch::Receiver<bool>,
    ) -> ReceiverStats {
        let mut stats = ReceiverStats::default();

        loop {
            let (stream, peer) = tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok(pair) => pair,
                    Err(e) => {
                        warn!("{}", ReceiverError::Accept(e));
                        continue;
                    }
                },
                _ = shutdown_requested(&mut shutdown) => break,
            };

            info!("Client from {}", peer);
            let stopped = self
                .serve_client(stream, &mut display, &mut stats, &mut shutdown)
                .await;
            info!("Client {} done, {} frames so far", peer, stats.frames);
            if stopped {
                break;
            }
        }

        info!(
            clients = stats.clients,
            frames = stats.frames,
            "Receiver shut down"
        );
        stats
    }

    /// Returns `true` if shutdown was requested mid-session.
    async fn serve_client<D: FrameDisplay>(
        &self,
        stream: TcpStream,
        display: &mut D,
        stats: &mut ReceiverStats,
        shutdown: &mut watch::Receiver<bool>,
    ) -> bool {
        let resource = self.config.resource.clone();
        let check_resource = move |request: &Request, response: Response| {
            if request.uri().path() == resource {
                Ok(response)
            } else {
                debug!("Unknown resource {}", request.uri().path());
                let mut rejection = ErrorResponse::new(Some("Not Found".to_string()));
                *rejection.status_mut() = StatusCode::NOT_FOUND;
                Err(rejection)
            }
        };

        let mut ws = match accept_hdr_async(stream, check_resource).await {
            Ok(ws) => ws,
            Err(e) => {
                stats.rejected += 1;
                info!("Handshake rejected: {}", e);
                return false;
            }
        };
        stats.clients += 1;

        let frame_len = self.config.frame_len();
        loop {
            let message = tokio::select! {
                message = ws.next() => message,
                _ = shutdown_requested(shutdown) => {
                    let _ = ws.close(None).await;
                    return true;
                }
            };

            match message {
                Some(Ok(Message::Binary(data))) if data.len() == frame_len => {
                    match display.show(&data) {
                        Ok(()) => stats.frames += 1,
                        Err(e) => warn!("{}", ReceiverError::Display(e.to_string())),
                    }
                }
                Some(Ok(Message::Binary(data))) => {
                    stats.ignored += 1;
                    debug!("Ignoring {} byte message, expected {}", data.len(), frame_len);
                }
                Some(Ok(Message::Close(_))) | None => return false,
                // pings are answered by the protocol layer
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    warn!("Client connection failed: {}", e);
                    return false;
                }
            }
        }
    }
}
