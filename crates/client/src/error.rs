//! Client error taxonomy and classification.

use std::fmt;

use mcp::{CallToolResult, ProtocolError, ToolContent, codes};
use thiserror::Error;

/// Boxed cause attached to classified errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Protocol codes that indicate a transient condition on the server side.
pub(crate) const TRANSIENT_CODES: [i32; 3] = [
    codes::REQUEST_TIMEOUT,
    codes::CONNECTION_CLOSED,
    codes::INTERNAL_ERROR,
];

/// Lower-cased fragments that identify a network-layer failure.
const NETWORK_MARKERS: [&str; 8] = [
    "failed to fetch",
    "network error",
    "connection refused",
    "connection reset",
    "connection aborted",
    "econnrefused",
    "econnreset",
    "econnaborted",
];

/// Errors surfaced by the client.
///
/// Every public operation either succeeds or returns exactly one of these
/// kinds. Each kind keeps whatever caused it: `source()` for transport and
/// decode failures, the raw outcome for tool execution failures.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Handshake or network failure, or the session is not usable.
    #[error("{message}")]
    Connection {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    /// The server ran the tool and reported a failure.
    #[error("{message}")]
    ToolExecution {
        tool: String,
        message: String,
        content: Vec<ToolContent>,
        result: CallToolResult,
    },

    /// A successful outcome whose payload could not be decoded.
    #[error("{message}")]
    ResponseParse {
        message: String,
        raw: RawResponse,
        #[source]
        source: Option<BoxError>,
    },

    /// Anything else, including arguments rejected by the server.
    #[error("{message}")]
    Client {
        message: String,
        #[source]
        source: Option<BoxError>,
    },
}

/// What the decoder was looking at when it gave up.
#[derive(Debug, Clone, PartialEq)]
pub enum RawResponse {
    Text(String),
    Outcome(CallToolResult),
}

impl Error {
    pub(crate) fn connection(message: impl Into<String>) -> Self {
        Error::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn client(message: impl Into<String>, cause: impl Into<BoxError>) -> Self {
        Error::Client {
            message: message.into(),
            source: Some(cause.into()),
        }
    }

    pub(crate) fn tool_execution(
        tool: &str,
        message: impl Into<String>,
        result: CallToolResult,
    ) -> Self {
        Error::ToolExecution {
            tool: tool.to_string(),
            message: message.into(),
            content: result.content.clone(),
            result,
        }
    }

    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    pub fn is_connection(&self) -> bool {
        matches!(self, Error::Connection { .. })
    }

    /// Content items the server returned with a tool execution failure.
    pub fn tool_content(&self) -> Option<&[ToolContent]> {
        match self {
            Error::ToolExecution { content, .. } => Some(content),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Turn any failure into a client [`Error`].
///
/// Already-classified errors pass through untouched. Transport failures that
/// look transient (protocol timeout/closed/internal codes, timeouts, closed or
/// failed handshakes, network-layer messages) become [`Error::Connection`];
/// everything else becomes [`Error::Client`] prefixed with `context`.
pub fn classify(cause: impl Into<BoxError>, context: impl fmt::Display) -> Error {
    let cause = match cause.into().downcast::<Error>() {
        Ok(err) => return *err,
        Err(cause) => cause,
    };

    let (connection, message) = match cause.downcast_ref::<mcp::Error>() {
        Some(mcp::Error::Protocol(err)) => (
            TRANSIENT_CODES.contains(&err.code),
            protocol_message(&context, err),
        ),
        Some(mcp::Error::Timeout(_) | mcp::Error::Closed | mcp::Error::Handshake(_)) => {
            (true, format!("{context}: {cause}"))
        }
        _ => (is_network_failure(cause.as_ref()), format!("{context}: {cause}")),
    };

    if connection {
        Error::Connection {
            message,
            source: Some(cause),
        }
    } else {
        Error::Client {
            message,
            source: Some(cause),
        }
    }
}

fn protocol_message(context: &impl fmt::Display, err: &ProtocolError) -> String {
    let mut message = format!("{context}: MCP error {} - {}", err.code, err.message);
    let timeout = err.data.as_ref().and_then(|data| data.get("timeout"));
    if let Some(timeout) = timeout.filter(|t| t.is_number()) {
        message.push_str(&format!(" (timeout: {timeout})"));
    }
    message
}

/// Whether an error or anything in its source chain reads like a network
/// failure.
pub(crate) fn is_network_failure(err: &(dyn std::error::Error + 'static)) -> bool {
    std::iter::successors(Some(err), |e| e.source()).any(|e| {
        let message = e.to_string().to_lowercase();
        NETWORK_MARKERS.iter().any(|marker| message.contains(marker))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn classified_errors_pass_through() {
        let original = Error::connection("client is not connected");
        let classified = classify(original, "ignored context");
        assert!(classified.is_connection());
        assert_eq!(classified.to_string(), "client is not connected");
    }

    #[test]
    fn transient_protocol_codes_are_connection_errors() {
        for code in TRANSIENT_CODES {
            let cause = mcp::Error::Protocol(ProtocolError::new(code, "flaky"));
            let err = classify(cause, "call failed");
            assert!(err.is_retryable(), "code {code} should be transient");
        }
    }

    #[test]
    fn other_protocol_codes_are_client_errors() {
        let cause = mcp::Error::Protocol(
            ProtocolError::new(codes::METHOD_NOT_FOUND, "no such method")
                .with_data(json!({"timeout": 5000})),
        );
        let err = classify(cause, "failed to list tools");
        assert!(matches!(err, Error::Client { .. }));
        assert_eq!(
            err.to_string(),
            "failed to list tools: MCP error -32601 - no such method (timeout: 5000)"
        );
    }

    #[test]
    fn network_messages_are_connection_errors() {
        let cause = mcp::Error::Transport("tcp connect error: Connection refused (os error 111)".into());
        assert!(classify(cause, "call failed").is_connection());

        let io = std::io::Error::other("read ECONNRESET");
        assert!(classify(io, "call failed").is_connection());
    }

    #[test]
    fn handshake_failures_are_connection_errors() {
        let cause = mcp::Error::Handshake("server hung up".into());
        let err = classify(cause, "connection to http://localhost:3001/mcp failed");
        assert!(err.is_connection());
        assert_eq!(
            err.to_string(),
            "connection to http://localhost:3001/mcp failed: handshake failed: server hung up"
        );
    }

    #[test]
    fn unknown_failures_keep_their_cause() {
        let err = classify(std::io::Error::other("disk full"), "failed to call tool 'echo'");
        assert!(matches!(err, Error::Client { .. }));
        let source = std::error::Error::source(&err).expect("cause retained");
        assert_eq!(source.to_string(), "disk full");
    }

    #[test]
    fn tool_execution_exposes_content() {
        let result = CallToolResult::error(vec![ToolContent::text("bad arg")]);
        let err = Error::tool_execution("echo", "tool 'echo' failed", result);
        assert_eq!(err.tool_content(), Some(&[ToolContent::text("bad arg")][..]));
        assert!(!err.is_retryable());
    }
}
