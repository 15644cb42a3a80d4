//! Decoding of tool outcomes into typed results.

use mcp::{CallToolResult, ToolContent};
use serde::de::DeserializeOwned;

use crate::error::{Error, RawResponse, Result};

/// Decode the first text item of a successful outcome as JSON.
///
/// Only call this on outcomes the executor already accepted; an outcome that
/// still carries the error flag is rejected rather than decoded.
pub fn decode<T: DeserializeOwned>(outcome: CallToolResult, tool: &str) -> Result<T> {
    if outcome.is_error {
        return Err(parse_error(
            format!("tool '{tool}' result is flagged as an error and cannot be decoded"),
            outcome,
        ));
    }
    if outcome.content.is_empty() {
        return Err(parse_error(
            format!("no content found in successful result for tool '{tool}'"),
            outcome,
        ));
    }
    if !outcome.content.iter().any(ToolContent::is_text) {
        return Err(parse_error(
            format!("no text content found in successful result for tool '{tool}'"),
            outcome,
        ));
    }

    let text = outcome
        .content
        .into_iter()
        .find_map(ToolContent::into_text)
        .unwrap_or_default();

    serde_json::from_str(&text).map_err(|e| Error::ResponseParse {
        message: format!("failed to parse JSON result for tool '{tool}': {e}"),
        raw: RawResponse::Text(text.clone()),
        source: Some(Box::new(e)),
    })
}

fn parse_error(message: String, outcome: CallToolResult) -> Error {
    Error::ResponseParse {
        message,
        raw: RawResponse::Outcome(outcome),
        source: None,
    }
}
