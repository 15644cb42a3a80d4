//! Client configuration.

use std::time::Duration;

use mcp::{HttpOptions, Implementation, InitializeParams, StreamableHttpTransport};
use serde::Deserialize;
use serde_json::{Map, Value};
use url::Url;

use crate::client::McpClient;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;

pub const DEFAULT_CLIENT_NAME: &str = "mcp-client-rust";
pub const DEFAULT_CLIENT_VERSION: &str = "0.1.0";

/// Default per-call timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(60_000);

/// Everything a client needs to know before it connects.
///
/// Immutable once the client is built; two clients with different
/// policies never share state.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub server_url: Url,
    pub client_name: String,
    pub client_version: String,
    /// Capabilities advertised to the server during the handshake.
    pub client_capabilities: Map<String, Value>,
    /// Timeout for the handshake and for any call without its own.
    pub timeout: Duration,
    pub retry: RetryPolicy,
    pub transport: HttpOptions,
    pub protocol: ProtocolOptions,
}

impl ClientConfig {
    /// Configuration with defaults for everything but the endpoint.
    pub fn new(server_url: &str) -> Result<Self> {
        let server_url = Url::parse(server_url).map_err(|e| {
            Error::client(format!("invalid server URL '{server_url}'"), e)
        })?;

        Ok(Self {
            server_url,
            client_name: DEFAULT_CLIENT_NAME.to_string(),
            client_version: DEFAULT_CLIENT_VERSION.to_string(),
            client_capabilities: Map::new(),
            timeout: DEFAULT_TIMEOUT,
            retry: RetryPolicy::default(),
            transport: HttpOptions::default(),
            protocol: ProtocolOptions::default(),
        })
    }

    pub(crate) fn initialize_params(&self) -> InitializeParams {
        InitializeParams {
            protocol_version: self.protocol.version.clone(),
            capabilities: self.client_capabilities.clone(),
            client_info: Implementation::new(&self.client_name, &self.client_version),
        }
    }
}

/// Protocol negotiation options.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProtocolOptions {
    /// Protocol version to request instead of the runtime's latest.
    #[serde(default)]
    pub version: Option<String>,
}

/// Per-call options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestOptions {
    /// Overrides the configured default timeout for one call.
    pub timeout: Option<Duration>,
}

impl RequestOptions {
    pub fn with_timeout(timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
        }
    }
}

/// Builder for [`McpClient`].
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    server_url: String,
    client_name: Option<String>,
    client_version: Option<String>,
    client_capabilities: Map<String, Value>,
    timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    transport: HttpOptions,
    protocol: ProtocolOptions,
}

impl ClientBuilder {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            client_name: None,
            client_version: None,
            client_capabilities: Map::new(),
            timeout: None,
            retry: None,
            transport: HttpOptions::default(),
            protocol: ProtocolOptions::default(),
        }
    }

    /// Name reported to the server. Empty names fall back to the default.
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn client_version(mut self, version: impl Into<String>) -> Self {
        self.client_version = Some(version.into());
        self
    }

    pub fn client_capabilities(mut self, capabilities: Map<String, Value>) -> Self {
        self.client_capabilities = capabilities;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = Some(retry);
        self
    }

    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.transport.auth_token = Some(token.into());
        self
    }

    pub fn transport_options(mut self, options: HttpOptions) -> Self {
        self.transport = options;
        self
    }

    pub fn protocol_version(mut self, version: impl Into<String>) -> Self {
        self.protocol.version = Some(version.into());
        self
    }

    /// Validate the endpoint and assemble the configuration.
    pub fn into_config(self) -> Result<ClientConfig> {
        let mut config = ClientConfig::new(&self.server_url)?;
        if let Some(name) = self.client_name.filter(|n| !n.is_empty()) {
            config.client_name = name;
        }
        if let Some(version) = self.client_version.filter(|v| !v.is_empty()) {
            config.client_version = version;
        }
        if let Some(timeout) = self.timeout.filter(|t| !t.is_zero()) {
            config.timeout = timeout;
        }
        if let Some(retry) = self.retry {
            config.retry = retry;
        }
        config.client_capabilities = self.client_capabilities;
        config.transport = self.transport;
        config.protocol = self.protocol;
        Ok(config)
    }

    /// Build a client for the streamable HTTP transport.
    pub fn build(self) -> Result<McpClient<StreamableHttpTransport>> {
        Ok(McpClient::new(self.into_config()?))
    }
}
