// ABOUTME: Typed error taxonomy for the bot framework
// ABOUTME: Connect/Transport/Pattern/Api variants, all returned as values rather than panicking

use thiserror::Error;

/// Errors surfaced by the framework.
///
/// Nothing here is fatal by itself: `Bot::run` returns `Transport` errors
/// to the caller, who decides whether to terminate or not.
#[derive(Debug, Error)]
pub enum Error {
    /// Handshake request failure, bad handshake status, handshake decode
    /// failure, or websocket dial failure.
    #[error("connect: {message}")]
    Connect { message: String },

    /// Send or receive failure on the open streaming connection.
    #[error("transport: {message}")]
    Transport { message: String },

    /// Invalid command pattern at registration time.
    #[error("invalid command pattern: {0}")]
    Pattern(#[from] regex::Error),

    /// Auxiliary Web API call failure: non-success status, decode failure,
    /// or an `ok: false` response from the platform.
    #[error("api: {message}")]
    Api { message: String },
}

impl Error {
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
