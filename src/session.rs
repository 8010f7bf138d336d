// ABOUTME: Transport session holding the persistent RTM streaming connection
// ABOUTME: Performs the rtm.start handshake, resolves bot identity, and decodes inbound frames

use crate::config::BotConfig;
use crate::error::{Error, Result};
use crate::outbound::Outbound;
use crate::wire::{ConnectResponse, Event};
use async_trait::async_trait;
use futures_util::stream::SplitStream;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Source of inbound entries consumed by the dispatch loop.
///
/// [`Session`] is the production implementation; tests script one.
#[async_trait]
pub trait EventSource: Send {
    async fn next_event(&mut self) -> Result<Event>;
}

/// The single long-lived streaming connection plus the bot identity
/// resolved during the handshake. Lives for the process lifetime; there
/// is no reconnect.
#[derive(Debug)]
pub struct Session {
    reader: SplitStream<WsStream>,
    outbound: Outbound,
    bot_id: String,
}

impl Session {
    /// Perform the `rtm.start` handshake and open the streaming connection.
    ///
    /// Fails with [`Error::Connect`] on a non-success handshake status, an
    /// undecodable handshake body, an `ok: false` response, or a failed
    /// websocket dial.
    pub async fn connect(config: &BotConfig) -> Result<Self> {
        let url = format!("{}/rtm.start", config.api_base_url);
        let response = reqwest::Client::new()
            .get(&url)
            .query(&[("token", config.token.as_str())])
            .send()
            .await
            .map_err(|e| Error::connect(format!("rtm.start request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::connect(format!(
                "unable to connect to streaming API, status {status}"
            )));
        }

        let handshake: ConnectResponse = response
            .json()
            .await
            .map_err(|e| Error::connect(format!("rtm.start response did not decode: {e}")))?;

        if !handshake.ok {
            return Err(Error::connect(format!(
                "rtm.start rejected: {}",
                handshake.error
            )));
        }

        let (stream, _) = connect_async(handshake.url.as_str())
            .await
            .map_err(|e| Error::connect(format!("websocket dial failed: {e}")))?;
        let (sink, reader) = stream.split();

        let bot_id = handshake.self_identity.id;
        tracing::info!(bot_id = %bot_id, "connected to streaming API");

        Ok(Self {
            reader,
            outbound: Outbound::new(sink, config.token.clone()),
            bot_id,
        })
    }

    /// Identity string the platform assigned to this bot.
    pub fn bot_id(&self) -> &str {
        &self.bot_id
    }

    /// Clonable handle to the writer half of the connection.
    pub fn outbound(&self) -> Outbound {
        self.outbound.clone()
    }

    /// Block until the next inbound entry arrives.
    ///
    /// Ping/pong/binary frames are skipped as keepalive noise. A text
    /// frame that is not valid JSON is logged at `warn` and skipped
    /// (log-and-continue, never silent). Stream end or a websocket error
    /// returns [`Error::Transport`].
    pub async fn receive_next(&mut self) -> Result<Event> {
        loop {
            let frame = self
                .reader
                .next()
                .await
                .ok_or_else(|| Error::transport("streaming connection closed"))?
                .map_err(|e| Error::transport(format!("websocket receive failed: {e}")))?;

            match frame {
                WsMessage::Text(text) => match serde_json::from_str::<Event>(text.as_str()) {
                    Ok(event) => return Ok(event),
                    Err(e) => {
                        tracing::warn!(error = %e, "skipping frame that did not decode");
                    }
                },
                WsMessage::Close(_) => {
                    return Err(Error::transport("streaming connection closed by peer"));
                }
                _ => {}
            }
        }
    }
}

#[async_trait]
impl EventSource for Session {
    async fn next_event(&mut self) -> Result<Event> {
        self.receive_next().await
    }
}
