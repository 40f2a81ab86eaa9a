use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, info, warn};

use crate::frame_stream::common::error::TransportError;
use crate::frame_stream::transport::Transport;

/// Largest binary message the remote panel accepts.
pub const DEFAULT_MAX_FRAME_LEN: usize = 160 * 128 * 2;

/// Binary WebSocket client feeding a bounded queue.
///
/// `send` copies the frame into the queue and returns immediately; a
/// background task writes queued frames to the socket in order. When the
/// queue is full the frame is dropped and reported as `Saturated`; once the
/// socket fails every send reports `Closed`.
pub struct WebSocketTransport {
    url: String,
    max_frame_len: usize,
    queue: mpsc::Sender<Vec<u8>>,
    writer: JoinHandle<()>,
}

impl WebSocketTransport {
    pub async fn connect(url: &str, queue_depth: usize) -> Result<Self, TransportError> {
        Self::connect_with_limit(url, queue_depth, DEFAULT_MAX_FRAME_LEN).await
    }

    pub async fn connect_with_limit(
        url: &str,
        queue_depth: usize,
        max_frame_len: usize,
    ) -> Result<Self, TransportError> {
        let (ws, _response) = connect_async(url)
            .await
            .map_err(|e| TransportError::Connect {
                url: url.to_string(),
                reason: e.to_string(),
            })?;
        info!("Connected to {}", url);

        let (mut sink, mut incoming) = ws.split();
        let (queue, mut pending) = mpsc::channel::<Vec<u8>>(queue_depth.max(1));
        let peer = url.to_string();

        let writer = tokio::spawn(async move {
            loop {
                tokio::select! {
                    frame = pending.recv() => match frame {
                        Some(frame) => {
                            if let Err(e) = sink.send(Message::Binary(frame)).await {
                                warn!("Send to {} failed: {}", peer, e);
                                break;
                            }
                        }
                        None => {
                            let _ = sink.close().await;
                            break;
                        }
                    },
                    message = incoming.next() => match message {
                        Some(Ok(Message::Close(_))) | None => {
                            info!("{} closed the connection", peer);
                            break;
                        }
                        Some(Err(e)) => {
                            warn!("Connection to {} failed: {}", peer, e);
                            break;
                        }
                        Some(Ok(_)) => {}
                    },
                }
            }
            debug!("Writer for {} stopped", peer);
        });

        Ok(Self {
            url: url.to_string(),
            max_frame_len,
            queue,
            writer,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }

    /// Flushes queued frames, sends a close frame and waits for the writer.
    pub async fn close(self) {
        drop(self.queue);
        if let Err(e) = self.writer.await {
            warn!("Writer for {} panicked: {}", self.url, e);
        }
    }
}

impl Transport for WebSocketTransport {
    fn send(&mut self, bytes: &[u8]) -> Result<(), TransportError> {
        if bytes.len() > self.max_frame_len {
            return Err(TransportError::FrameTooLarge {
                actual: bytes.len(),
                limit: self.max_frame_len,
            });
        }

        // The caller reuses its buffer next tick, so a queued frame owns a copy.
        self.queue.try_send(bytes.to_vec()).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => TransportError::Saturated,
            mpsc::error::TrySendError::Closed(_) => TransportError::Closed,
        })
    }
}
