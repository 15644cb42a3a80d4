//! Streamable HTTP transport backed by the official rmcp SDK.

use std::sync::Arc;

use rmcp::{
    ServiceExt,
    model::{CallToolRequestParams, ClientInfo},
    service::{RoleClient, RunningService, ServiceError},
    transport::{
        StreamableHttpClientTransport, streamable_http_client::StreamableHttpClientTransportConfig,
    },
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result, chain_message};
use crate::protocol::{
    CallToolParams, CallToolResult, InitializeParams, InitializeResult, ProtocolError, Tool,
};
use crate::transport::{Peer, Transport};

/// Options for the HTTP transport.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HttpOptions {
    /// Bearer token sent in the `Authorization` header.
    #[serde(default)]
    pub auth_token: Option<String>,
}

/// Streamable HTTP transport addressed by a URI.
///
/// Nothing touches the network until [`Transport::handshake`].
#[derive(Debug, Clone)]
pub struct StreamableHttpTransport {
    uri: Arc<str>,
    options: HttpOptions,
}

impl StreamableHttpTransport {
    pub fn new(uri: impl AsRef<str>, options: HttpOptions) -> Self {
        Self {
            uri: Arc::from(uri.as_ref()),
            options,
        }
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Transport for StreamableHttpTransport {
    type Peer = StreamableHttpPeer;

    async fn handshake(&mut self, params: &InitializeParams) -> Result<StreamableHttpPeer> {
        let mut config = StreamableHttpClientTransportConfig::with_uri(self.uri.clone());
        config.auth_header = self.options.auth_token.clone();
        let transport = StreamableHttpClientTransport::from_config(config);

        let service = client_info(params)?
            .serve(transport)
            .await
            .map_err(|e| Error::Handshake(chain_message(&e)))?;

        let server_info = service.peer_info().map(convert).transpose()?;

        Ok(StreamableHttpPeer {
            service,
            server_info,
        })
    }

    async fn close(self) -> Result<()> {
        // The HTTP channel is owned by the running service once the handshake
        // has happened; closing the peer already released it.
        debug!(uri = %self.uri, "streamable HTTP transport released");
        Ok(())
    }
}

/// An initialized rmcp client session.
pub struct StreamableHttpPeer {
    service: RunningService<RoleClient, ClientInfo>,
    server_info: Option<InitializeResult>,
}

impl Peer for StreamableHttpPeer {
    fn server_info(&self) -> Option<InitializeResult> {
        self.server_info.clone()
    }

    async fn list_tools(&self) -> Result<Vec<Tool>> {
        let response = self.service.list_tools(Default::default()).await?;
        response.tools.iter().map(convert).collect()
    }

    async fn call_tool(&self, params: CallToolParams) -> Result<CallToolResult> {
        let request = CallToolRequestParams {
            name: params.name.into(),
            arguments: params.arguments,
            meta: None,
            task: None,
        };

        let result = self.service.call_tool(request).await?;
        convert(&result)
    }

    async fn close(self) -> Result<()> {
        self.service
            .cancel()
            .await
            .map(|_| ())
            .map_err(|e| Error::Transport(e.to_string()))
    }
}

impl From<ServiceError> for Error {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::McpError(data) => Error::Protocol(ProtocolError {
                code: data.code.0,
                message: data.message.to_string(),
                data: data.data,
            }),
            ServiceError::Timeout { timeout } => Error::Timeout(timeout),
            ServiceError::TransportClosed => Error::Closed,
            other => Error::Transport(chain_message(&other)),
        }
    }
}

/// Move a value between the SDK's model and ours through their shared JSON
/// shape.
fn convert<S: Serialize, D: DeserializeOwned>(value: &S) -> Result<D> {
    Ok(serde_json::from_value(serde_json::to_value(value)?)?)
}

/// Overlay our initialize params onto the SDK's defaults.
fn client_info(params: &InitializeParams) -> Result<ClientInfo> {
    let mut info = serde_json::to_value(ClientInfo::default())?;
    if let (Value::Object(base), Value::Object(ours)) = (&mut info, serde_json::to_value(params)?) {
        base.extend(ours);
    }
    Ok(serde_json::from_value(info)?)
}
