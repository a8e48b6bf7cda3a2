//! WebSocket transport using `tokio-tungstenite`.
//!
//! Each accepted connection is split into an independent writer and
//! reader half, so the handler can forward broadcast pushes from a
//! channel while blocked on the next inbound frame.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use sixstone_protocol::ConnectionId;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;

/// Counter for generating unique connection IDs.
static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

type WsStream = tokio_tungstenite::WebSocketStream<TcpStream>;

/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// The connection was closed.
    #[error("connection closed: {0}")]
    ConnectionClosed(String),

    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),
}

/// A WebSocket listener accepting incoming client connections.
pub struct WsListener {
    listener: TcpListener,
}

impl WsListener {
    /// Binds the listener to the given address.
    pub async fn bind(addr: &str) -> Result<Self, TransportError> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(TransportError::AcceptFailed)?;
        tracing::info!(addr, "WebSocket listener bound");
        Ok(Self { listener })
    }

    /// Returns the local address the listener is bound to.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Accepts the next connection and completes the WebSocket
    /// upgrade.
    pub async fn accept(&mut self) -> Result<WsConnection, TransportError> {
        let (stream, addr) = self
            .listener
            .accept()
            .await
            .map_err(TransportError::AcceptFailed)?;

        let ws = tokio_tungstenite::accept_async(stream).await.map_err(|e| {
            TransportError::AcceptFailed(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                e,
            ))
        })?;

        let id = ConnectionId(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed));
        tracing::debug!(%id, %addr, "accepted WebSocket connection");

        Ok(WsConnection { id, ws })
    }
}

/// A single accepted WebSocket connection, not yet split.
pub struct WsConnection {
    id: ConnectionId,
    ws: WsStream,
}

impl WsConnection {
    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Splits the connection into independent writer and reader
    /// halves.
    pub fn split(self) -> (WsWriter, WsReader) {
        let (sink, stream) = self.ws.split();
        (WsWriter { sink }, WsReader { stream })
    }
}

/// The outbound half of a connection.
pub struct WsWriter {
    sink: SplitSink<WsStream, Message>,
}

impl WsWriter {
    /// Sends one binary frame.
    pub async fn send(&mut self, data: &[u8]) -> Result<(), TransportError> {
        self.sink
            .send(Message::Binary(data.to_vec().into()))
            .await
            .map_err(|e| {
                TransportError::SendFailed(std::io::Error::new(
                    std::io::ErrorKind::BrokenPipe,
                    e,
                ))
            })
    }

    /// Sends a close frame. Errors are irrelevant at this point.
    pub async fn close(&mut self) {
        let _ = self.sink.send(Message::Close(None)).await;
    }
}

/// The inbound half of a connection.
pub struct WsReader {
    stream: SplitStream<WsStream>,
}

impl WsReader {
    /// Receives the next data frame. Returns `None` on a clean close.
    /// Binary and text frames both count as data; control frames are
    /// skipped.
    pub async fn recv(&mut self) -> Result<Option<Vec<u8>>, TransportError> {
        loop {
            match self.stream.next().await {
                Some(Ok(Message::Binary(data))) => return Ok(Some(data.into())),
                Some(Ok(Message::Text(text))) => {
                    return Ok(Some(text.as_bytes().to_vec()));
                }
                Some(Ok(Message::Close(_))) | None => return Ok(None),
                Some(Ok(_)) => continue, // skip ping/pong/frame
                Some(Err(e)) => {
                    return Err(TransportError::ReceiveFailed(std::io::Error::new(
                        std::io::ErrorKind::ConnectionReset,
                        e,
                    )));
                }
            }
        }
    }
}
