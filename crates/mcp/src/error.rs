//! MCP error types.

use std::time::Duration;

use crate::protocol::ProtocolError;
use thiserror::Error;

/// Failures reported by a transport or protocol peer.
///
/// This enum is marked `#[non_exhaustive]` so new transports can add
/// failure modes without breaking downstream matches.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("connection closed")]
    Closed,

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("failed to convert protocol message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("MCP error: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("transport error: {0}")]
    Transport(String),
}

impl Error {
    /// Protocol error code, if the server answered with a JSON-RPC error.
    pub fn protocol_code(&self) -> Option<i32> {
        match self {
            Error::Protocol(err) => Some(err.code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Render an error and its whole `source()` chain on one line.
///
/// Runtimes tend to bury the interesting part ("Connection refused") a few
/// levels down, and only the message survives the conversion into [`Error`].
pub(crate) fn chain_message(err: &(dyn std::error::Error + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
