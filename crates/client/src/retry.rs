//! Retry policy and the tool invocation loop.

use std::future::Future;
use std::time::Duration;

use mcp::{CallToolResult, codes};
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{Error, Result, TRANSIENT_CODES, classify, is_network_failure};

pub const DEFAULT_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;

/// How many times a tool call is attempted, and how long to wait in between.
///
/// The wait before attempt `k + 1` is `delay_ms * 2^(k - 1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RetryPolicy {
    /// Attempt ceiling. Zero is treated as one.
    #[serde(default = "default_attempts")]
    pub attempts: u32,
    /// Base delay in milliseconds.
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,
}

fn default_attempts() -> u32 {
    DEFAULT_RETRY_ATTEMPTS
}

fn default_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: DEFAULT_RETRY_ATTEMPTS,
            delay_ms: DEFAULT_RETRY_DELAY_MS,
        }
    }
}

impl RetryPolicy {
    pub fn new(attempts: u32, base_delay: Duration) -> Self {
        Self {
            attempts,
            delay_ms: u64::try_from(base_delay.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }

    /// Delay after `failed` attempts: base * 2^(failed-1), saturating.
    pub fn backoff(&self, failed: u32) -> Duration {
        if failed == 0 {
            return Duration::ZERO;
        }
        let factor = 2u64.saturating_pow(failed - 1);
        Duration::from_millis(self.delay_ms.saturating_mul(factor))
    }

    /// Run `call` until it succeeds, fails for good, or attempts run out.
    ///
    /// Outcomes flagged `isError` count as failed attempts; they are never
    /// retried. Invalid-params rejections end the loop immediately.
    pub(crate) async fn execute<F, Fut>(&self, tool: &str, mut call: F) -> Result<CallToolResult>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = mcp::Result<CallToolResult>>,
    {
        let ceiling = self.attempts.max(1);
        let mut attempt = 0;

        let failure = loop {
            attempt += 1;
            let failure = match call().await {
                Ok(result) if !result.is_error => return Ok(result),
                Ok(result) => {
                    warn!(tool, "tool reported an execution error via isError flag");
                    Failure::Execution(result)
                }
                Err(err) if err.protocol_code() == Some(codes::INVALID_PARAMS) => {
                    return Err(Error::client(
                        format!("invalid parameters for tool '{tool}': {err}"),
                        err,
                    ));
                }
                Err(err) => Failure::Transport(err),
            };

            warn!(tool, attempt, error = %failure, "tool call attempt failed");

            if attempt >= ceiling || !failure.is_retryable() {
                break failure;
            }

            let delay = self.backoff(attempt);
            info!(tool, ?delay, "retrying tool call");
            tokio::time::sleep(delay).await;
        };

        Err(failure.into_error(tool, attempt))
    }
}

/// Whether a transport failure is worth another attempt.
pub fn is_retryable(err: &mcp::Error) -> bool {
    match err {
        mcp::Error::Protocol(err) => TRANSIENT_CODES.contains(&err.code),
        mcp::Error::Timeout(_) | mcp::Error::Closed => true,
        other => is_network_failure(other),
    }
}

/// Why a single attempt failed.
enum Failure {
    Execution(CallToolResult),
    Transport(mcp::Error),
}

impl Failure {
    fn is_retryable(&self) -> bool {
        match self {
            Failure::Execution(_) => false,
            Failure::Transport(err) => is_retryable(err),
        }
    }

    fn into_error(self, tool: &str, attempts: u32) -> Error {
        match self {
            Failure::Execution(result) => Error::tool_execution(
                tool,
                format!("tool '{tool}' reported an execution error via isError flag"),
                result,
            ),
            Failure::Transport(err) => match embedded_outcome(&err) {
                Some(result) => Error::tool_execution(
                    tool,
                    format!(
                        "tool '{tool}' reported an execution error after {attempts} attempts"
                    ),
                    result,
                ),
                None => classify(
                    err,
                    format!("failed to call tool '{tool}' after {attempts} attempts"),
                ),
            },
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Failure::Execution(result) => {
                let text = result.first_text().unwrap_or("no text content");
                write!(f, "execution error: {text}")
            }
            Failure::Transport(err) => write!(f, "{err}"),
        }
    }
}

/// An error outcome some servers tuck into the protocol error's data.
fn embedded_outcome(err: &mcp::Error) -> Option<CallToolResult> {
    let mcp::Error::Protocol(err) = err else {
        return None;
    };
    let data = err.data.clone()?;
    serde_json::from_value::<CallToolResult>(data)
        .ok()
        .filter(|result| result.is_error)
}
