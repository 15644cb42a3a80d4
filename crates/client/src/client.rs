//! The client facade.

use mcp::{
    CallToolResult, Implementation, ServerCapabilities, StreamableHttpTransport, Tool, Transport,
};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use crate::config::{ClientBuilder, ClientConfig, RequestOptions};
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::retry::RetryPolicy;
use crate::session::{ServerInformation, Session};

/// A typed client for one MCP server.
///
/// `connect` and `close` need `&mut self`; requests only need `&self`, so a
/// session can't be torn down under an in-flight call.
pub struct McpClient<T: Transport = StreamableHttpTransport> {
    config: ClientConfig,
    session: Session<T>,
}

impl McpClient<StreamableHttpTransport> {
    /// Create a builder for a client talking to `server_url`.
    pub fn builder(server_url: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(server_url)
    }

    /// Connect over streamable HTTP to the configured endpoint.
    pub async fn connect(&mut self) -> Result<ServerInformation> {
        let transport =
            StreamableHttpTransport::new(self.config.server_url.as_str(), self.config.transport.clone());
        self.session.connect(transport).await
    }
}

impl<T: Transport> McpClient<T> {
    pub fn new(config: ClientConfig) -> Self {
        let session = Session::new(&config);
        Self { config, session }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Connect over a caller-supplied transport.
    pub async fn connect_with(&mut self, transport: T) -> Result<ServerInformation> {
        self.session.connect(transport).await
    }

    /// Disconnect. Safe to call at any time, any number of times.
    pub async fn close(&mut self) {
        self.session.close().await;
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_connected()
    }

    pub fn server_information(&self) -> Option<ServerInformation> {
        self.session.server_information()
    }

    pub fn server_info(&self) -> Option<Implementation> {
        self.session.server_info()
    }

    pub fn capabilities(&self) -> Option<ServerCapabilities> {
        self.session.capabilities()
    }

    pub fn instructions(&self) -> Option<String> {
        self.session.instructions()
    }

    pub fn protocol_version(&self) -> Option<String> {
        self.session.protocol_version()
    }

    /// List the tools the server offers, in server order.
    pub async fn list_tools(&self, options: RequestOptions) -> Result<Vec<Tool>> {
        self.session.list_tools(options).await
    }

    /// Invoke a tool and return its raw outcome.
    ///
    /// `retry` overrides the configured retry policy for this call only.
    pub async fn call_tool_raw(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
        retry: Option<RetryPolicy>,
        options: RequestOptions,
    ) -> Result<CallToolResult> {
        self.session
            .call_tool_raw(name, arguments, retry, options)
            .await
    }

    /// Invoke a tool with typed arguments and decode its JSON result.
    pub async fn call_tool<A, R>(&self, name: &str, arguments: &A, options: RequestOptions) -> Result<R>
    where
        A: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let arguments = to_arguments(name, arguments)?;
        let outcome = self.call_tool_raw(name, &arguments, None, options).await?;
        decode(outcome, name)
    }
}

fn to_arguments<A: Serialize + ?Sized>(tool: &str, arguments: &A) -> Result<Map<String, Value>> {
    match serde_json::to_value(arguments) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(Value::Null) => Ok(Map::new()),
        Ok(other) => Err(Error::Client {
            message: format!("arguments for tool '{tool}' must be a JSON object, got {other}"),
            source: None,
        }),
        Err(e) => Err(Error::client(
            format!("failed to serialize arguments for tool '{tool}'"),
            e,
        )),
    }
}
