//! Configuration loading from mcpc.toml.

use std::path::Path;
use std::time::Duration;

use client::{ClientBuilder, HttpOptions, ProtocolOptions, RetryPolicy};
use serde::Deserialize;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3001/mcp";

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// MCP endpoint, e.g. `http://localhost:3001/mcp`.
    pub server_url: Option<String>,

    pub client_name: Option<String>,
    pub client_version: Option<String>,

    /// Default per-call timeout in milliseconds.
    pub timeout_ms: Option<u64>,

    /// Retry policy for tool calls.
    pub retry: Option<RetryPolicy>,

    #[serde(default)]
    pub transport: HttpOptions,

    #[serde(default)]
    pub protocol: ProtocolOptions,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string.
    pub fn parse(toml: &str) -> Result<Self, ConfigError> {
        toml::from_str(toml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Turn the file settings into a client builder.
    ///
    /// Command-line values win over the file.
    pub fn into_builder(self, url: Option<String>, timeout_ms: Option<u64>) -> ClientBuilder {
        let server_url = url
            .or(self.server_url)
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_string());

        let mut builder = ClientBuilder::new(server_url)
            .transport_options(self.transport);

        if let Some(name) = self.client_name {
            builder = builder.client_name(name);
        }
        if let Some(version) = self.client_version {
            builder = builder.client_version(version);
        }
        if let Some(ms) = timeout_ms.or(self.timeout_ms) {
            builder = builder.timeout(Duration::from_millis(ms));
        }
        if let Some(retry) = self.retry {
            builder = builder.retry(retry);
        }
        if let Some(version) = self.protocol.version {
            builder = builder.protocol_version(version);
        }
        builder
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(String),
}
