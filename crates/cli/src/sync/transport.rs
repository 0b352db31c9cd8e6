// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Transport abstraction for delivering actions.
//!
//! Provides a trait-based transport layer that enables:
//! - Real WebSocket delivery for production
//! - Per-kind routing to different backends
//! - Mock transports for unit testing

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use offq_core::protocol::{ClientMessage, ServerMessage};
use offq_core::{ActionKind, PendingAction};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Connection closed unexpectedly.
    #[error("connection closed")]
    ConnectionClosed,

    /// Send failed.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Receive failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(String),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// The remote refused the action.
    #[error("rejected: {0}")]
    Rejected(String),

    /// No answer within the submission timeout.
    #[error("timed out after {0}ms")]
    Timeout(u64),

    /// No transport registered for this kind.
    #[error("no transport for action kind {0}")]
    NoHandler(ActionKind),
}

/// Result type for transport operations.
pub type TransportResult<T> = Result<T, TransportError>;

/// Future returned by [`Transport::submit`].
pub type SubmitFuture<'a> = Pin<Box<dyn Future<Output = TransportResult<()>> + Send + 'a>>;

/// Delivers one action to its remote destination.
///
/// `Ok(())` means the remote accepted the action and it may be removed from
/// the queue. Any error keeps the action queued for a later attempt.
pub trait Transport: Send + Sync {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a>;
}

impl<T: Transport + ?Sized> Transport for Arc<T> {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a> {
        (**self).submit(action)
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a> {
        (**self).submit(action)
    }
}

/// Routes each action to the transport registered for its kind.
#[derive(Default)]
pub struct KindDispatcher {
    routes: HashMap<ActionKind, Box<dyn Transport>>,
}

impl KindDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `transport` for `kind`, replacing any previous route.
    pub fn route(mut self, kind: ActionKind, transport: impl Transport + 'static) -> Self {
        self.routes.insert(kind, Box::new(transport));
        self
    }

    pub fn handles(&self, kind: ActionKind) -> bool {
        self.routes.contains_key(&kind)
    }
}

impl Transport for KindDispatcher {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a> {
        match self.routes.get(&action.kind) {
            Some(transport) => transport.submit(action),
            None => Box::pin(async move { Err(TransportError::NoHandler(action.kind)) }),
        }
    }
}

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport implementation using tokio-tungstenite.
///
/// Connects lazily on the first submission and reuses the connection until
/// it breaks. Submissions are serialized over the single connection.
pub struct WebSocketTransport {
    url: String,
    /// The WebSocket connection, if connected.
    ws: Mutex<Option<WsStream>>,
}

impl WebSocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        WebSocketTransport { url: url.into(), ws: Mutex::new(None) }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Check if connected.
    pub async fn is_connected(&self) -> bool {
        self.ws.lock().await.is_some()
    }

    /// Sends the action and waits for the answer carrying its id.
    async fn exchange(ws: &mut WsStream, action: &PendingAction) -> TransportResult<()> {
        let json = ClientMessage::submit(action)
            .to_json()
            .map_err(|e| TransportError::SerializationError(e.to_string()))?;

        ws.send(Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;

        loop {
            let text = match ws.next().await {
                Some(Ok(Message::Text(text))) => text,
                Some(Ok(Message::Close(_))) | None => return Err(TransportError::ConnectionClosed),
                // Ignore ping/pong and binary frames
                Some(Ok(_)) => continue,
                Some(Err(e)) => return Err(TransportError::ReceiveFailed(e.to_string())),
            };

            let msg = ServerMessage::from_json(&text)
                .map_err(|e| TransportError::SerializationError(e.to_string()))?;

            match msg {
                ServerMessage::Ack { id } if id == action.id => return Ok(()),
                ServerMessage::Rejected { id, reason } if id == action.id => {
                    return Err(TransportError::Rejected(reason));
                }
                ServerMessage::Error { message } => return Err(TransportError::Rejected(message)),
                // Late answer for an earlier, timed-out submission
                other => {
                    tracing::debug!("ignoring unrelated server message: {:?}", other);
                }
            }
        }
    }
}

impl Transport for WebSocketTransport {
    fn submit<'a>(&'a self, action: &'a PendingAction) -> SubmitFuture<'a> {
        Box::pin(async move {
            let mut guard = self.ws.lock().await;

            let ws = match guard.as_mut() {
                Some(ws) => ws,
                None => {
                    let (stream, _) = tokio_tungstenite::connect_async(self.url.as_str())
                        .await
                        .map_err(|e| TransportError::ConnectionFailed(e.to_string()))?;
                    tracing::debug!("connected to {}", self.url);
                    guard.insert(stream)
                }
            };

            let result = Self::exchange(ws, action).await;
            if let Err(
                TransportError::SendFailed(_)
                | TransportError::ReceiveFailed(_)
                | TransportError::ConnectionClosed,
            ) = &result
            {
                // Connection is broken, clear it
                *guard = None;
            }
            result
        })
    }
}
