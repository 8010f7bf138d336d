// ABOUTME: Outbound sender pushing messages onto the streaming connection
// ABOUTME: Serializes concurrent writers behind a mutex and stamps the message counter and token

use crate::error::{Error, Result};
use crate::session::WsStream;
use crate::wire::OutboundMessage;
use async_trait::async_trait;
use futures_util::stream::SplitSink;
use futures_util::SinkExt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio_tungstenite::tungstenite::Message as WsMessage;

/// Anything a handler can push an outbound entry into.
///
/// The production implementation is [`Outbound`]; tests substitute a
/// recording sink.
#[async_trait]
pub trait MessageSink: Send + Sync {
    async fn send(&self, message: OutboundMessage) -> Result<()>;
}

/// Writer half of the streaming connection.
///
/// Clonable; all clones share one sink guarded by a mutex, so concurrent
/// handler tasks never interleave partial writes on the wire. Each sent
/// message gets the next value of a shared monotonic counter as its id.
#[derive(Clone, Debug)]
pub struct Outbound {
    sink: Arc<Mutex<SplitSink<WsStream, WsMessage>>>,
    counter: Arc<AtomicU64>,
    token: String,
}

impl Outbound {
    pub(crate) fn new(sink: SplitSink<WsStream, WsMessage>, token: String) -> Self {
        Self {
            sink: Arc::new(Mutex::new(sink)),
            counter: Arc::new(AtomicU64::new(0)),
            token,
        }
    }
}

#[async_trait]
impl MessageSink for Outbound {
    async fn send(&self, mut message: OutboundMessage) -> Result<()> {
        message.id = self.counter.fetch_add(1, Ordering::Relaxed) + 1;
        message.token = self.token.clone();

        let json = serde_json::to_string(&message)
            .map_err(|e| Error::transport(format!("failed to encode outbound message: {e}")))?;

        tracing::debug!(id = message.id, channel = %message.channel, "sending message");

        let mut sink = self.sink.lock().await;
        sink.send(WsMessage::text(json))
            .await
            .map_err(|e| Error::transport(format!("websocket send failed: {e}")))?;
        Ok(())
    }
}
