//! Session lifecycle: connect, close, and requests over a live session.

use std::future::Future;
use std::time::Duration;

use mcp::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult, Peer,
    ServerCapabilities, Tool, Transport, codes,
};
use serde_json::{Map, Value};
use tracing::{Instrument, debug, info, info_span, warn};
use url::Url;

use crate::config::{ClientConfig, RequestOptions};
use crate::error::{Error, Result, classify};
use crate::retry::RetryPolicy;

/// What the server told us about itself during the handshake.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInformation {
    pub server_info: Implementation,
    pub capabilities: ServerCapabilities,
    pub instructions: Option<String>,
    pub protocol_version: Option<String>,
}

impl ServerInformation {
    /// `None` unless both identity and capabilities are present.
    fn from_handshake(result: InitializeResult) -> Option<Self> {
        Some(Self {
            server_info: result.server_info?,
            capabilities: result.capabilities?,
            instructions: result.instructions,
            protocol_version: result.protocol_version,
        })
    }
}

/// Connection state. The transport and the peer exist together or not at all.
enum State<T: Transport> {
    Disconnected,
    Connected { transport: T, peer: T::Peer },
}

/// One logical session with one server.
pub struct Session<T: Transport> {
    endpoint: Url,
    params: InitializeParams,
    timeout: Duration,
    retry: RetryPolicy,
    state: State<T>,
}

impl<T: Transport> Session<T> {
    pub fn new(config: &ClientConfig) -> Self {
        Self {
            endpoint: config.server_url.clone(),
            params: config.initialize_params(),
            timeout: config.timeout,
            retry: config.retry,
            state: State::Disconnected,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_connected(&self) -> bool {
        matches!(self.state, State::Connected { .. })
    }

    /// Handshake over `transport` and make the session live.
    ///
    /// When already connected, returns the live session's identity and drops
    /// `transport` untouched.
    pub async fn connect(&mut self, transport: T) -> Result<ServerInformation> {
        if let State::Connected { peer, .. } = &self.state {
            warn!(endpoint = %self.endpoint, "client is already connected");
            return peer
                .server_info()
                .and_then(ServerInformation::from_handshake)
                .ok_or_else(|| {
                    Error::connection("already connected, but server information is unavailable")
                });
        }

        let span = info_span!("connecting", endpoint = %self.endpoint);
        self.handshake(transport).instrument(span).await
    }

    async fn handshake(&mut self, mut transport: T) -> Result<ServerInformation> {
        let peer = match with_timeout(self.timeout, transport.handshake(&self.params)).await {
            Ok(peer) => peer,
            Err(err) => {
                close_transport(transport).await;
                return Err(self.handshake_error(err));
            }
        };

        let Some(info) = peer.server_info().and_then(ServerInformation::from_handshake) else {
            close_peer(peer).await;
            close_transport(transport).await;
            return Err(Error::connection(
                "connected, but failed to retrieve essential server information",
            ));
        };

        info!(
            endpoint = %self.endpoint,
            server = %info.server_info.name,
            version = %info.server_info.version,
            "MCP client connected"
        );
        self.state = State::Connected { transport, peer };
        Ok(info)
    }

    fn handshake_error(&self, err: mcp::Error) -> Error {
        let endpoint = &self.endpoint;
        match &err {
            mcp::Error::Protocol(p)
                if p.code == codes::CONNECTION_CLOSED && p.message.contains("protocol version") =>
            {
                let message = format!(
                    "protocol version mismatch or other initialization failure: {}",
                    p.message
                );
                Error::Connection {
                    message,
                    source: Some(Box::new(err)),
                }
            }
            mcp::Error::Timeout(timeout) => {
                let context = format!("connection to {endpoint} failed (timeout: {timeout:?})");
                classify(err, context)
            }
            _ => classify(err, format!("connection to {endpoint} failed")),
        }
    }

    /// Tear the session down. A no-op when not connected.
    ///
    /// Closes the peer, then the transport; a failing step is logged and the
    /// next one still runs. The session is disconnected afterwards no matter
    /// what.
    pub async fn close(&mut self) {
        let State::Connected { transport, peer } =
            std::mem::replace(&mut self.state, State::Disconnected)
        else {
            debug!(endpoint = %self.endpoint, "client is not connected or already closed");
            return;
        };

        close_peer(peer).await;
        close_transport(transport).await;
        info!(endpoint = %self.endpoint, "MCP client disconnected");
    }

    /// The live peer, or a connection error.
    pub fn ensure_connected(&self) -> Result<&T::Peer> {
        match &self.state {
            State::Connected { peer, .. } => Ok(peer),
            State::Disconnected => Err(Error::connection(
                "client is not connected; call connect() first",
            )),
        }
    }

    pub fn server_information(&self) -> Option<ServerInformation> {
        match &self.state {
            State::Connected { peer, .. } => {
                peer.server_info().and_then(ServerInformation::from_handshake)
            }
            State::Disconnected => None,
        }
    }

    pub fn server_info(&self) -> Option<Implementation> {
        self.server_information().map(|info| info.server_info)
    }

    pub fn capabilities(&self) -> Option<ServerCapabilities> {
        self.server_information().map(|info| info.capabilities)
    }

    pub fn instructions(&self) -> Option<String> {
        self.server_information().and_then(|info| info.instructions)
    }

    pub fn protocol_version(&self) -> Option<String> {
        self.server_information()
            .and_then(|info| info.protocol_version)
    }

    /// List the server's tools.
    pub async fn list_tools(&self, options: RequestOptions) -> Result<Vec<Tool>> {
        let peer = self.ensure_connected()?;
        let timeout = options.timeout.unwrap_or(self.timeout);
        with_timeout(timeout, peer.list_tools())
            .await
            .map_err(|e| classify(e, "failed to list tools"))
    }

    /// Invoke a tool with retries and return its raw outcome.
    pub async fn call_tool_raw(
        &self,
        name: &str,
        arguments: &Map<String, Value>,
        retry: Option<RetryPolicy>,
        options: RequestOptions,
    ) -> Result<CallToolResult> {
        let peer = self.ensure_connected()?;
        let policy = retry.unwrap_or(self.retry);
        let timeout = options.timeout.unwrap_or(self.timeout);

        policy
            .execute(name, move || {
                let params = CallToolParams {
                    name: name.to_string(),
                    arguments: Some(arguments.clone()),
                };
                with_timeout(timeout, peer.call_tool(params))
            })
            .await
    }
}

/// Bound `fut` by `timeout`, reporting expiry as a transport timeout.
async fn with_timeout<F, O>(timeout: Duration, fut: F) -> mcp::Result<O>
where
    F: Future<Output = mcp::Result<O>>,
{
    tokio::time::timeout(timeout, fut)
        .await
        .unwrap_or(Err(mcp::Error::Timeout(timeout)))
}

async fn close_peer<P: Peer>(peer: P) {
    if let Err(e) = peer.close().await {
        warn!(error = %e, "failed to close MCP session");
    }
}

async fn close_transport<T: Transport>(transport: T) {
    if let Err(e) = transport.close().await {
        warn!(error = %e, "failed to close transport");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Reply, Script, ScriptedTransport};
    use mcp::{ProtocolError, ToolContent};
    use serde_json::json;

    fn session() -> Session<ScriptedTransport> {
        let config = ClientConfig::new("http://localhost:3001/mcp").unwrap();
        Session::new(&config)
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn connect_populates_identity() {
        let script = Script::new();
        let mut session = session();

        let info = session.connect(ScriptedTransport::new(&script)).await.unwrap();

        assert!(session.is_connected());
        assert_eq!(info.server_info.name, "scripted");
        assert_eq!(session.server_info(), Some(info.server_info.clone()));
        assert_eq!(session.instructions().as_deref(), Some("be nice"));
        assert_eq!(session.protocol_version().as_deref(), Some("2025-03-26"));
        assert!(session.capabilities().is_some());
    }

    #[tokio::test]
    async fn accessors_are_empty_when_disconnected() {
        let session = session();
        assert!(!session.is_connected());
        assert!(session.server_information().is_none());
        assert!(session.server_info().is_none());
        assert!(session.capabilities().is_none());
        assert!(session.instructions().is_none());
        assert!(session.protocol_version().is_none());
    }

    #[tokio::test]
    async fn second_connect_reuses_live_session() {
        let script = Script::new();
        let mut session = session();
        let first = session.connect(ScriptedTransport::new(&script)).await.unwrap();

        let second = session.connect(ScriptedTransport::new(&script)).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(script.state().handshakes, 1);
        assert_eq!(script.state().transports_closed, 0);
    }

    #[tokio::test]
    async fn second_connect_fails_when_identity_is_gone() {
        let script = Script::new();
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();
        script.state().forget_identity = true;

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(session.is_connected());
        assert_eq!(script.state().handshakes, 1);
    }

    #[tokio::test]
    async fn unreachable_endpoint_is_a_connection_error() {
        let script = Script::new();
        script.state().handshake_error = Some(mcp::Error::Handshake(
            "error sending request: tcp connect error: Connection refused (os error 111)".into(),
        ));
        let mut session = session();

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().starts_with("connection to http://localhost:3001/mcp failed"));
        assert!(!session.is_connected());
        assert_eq!(script.state().transports_closed, 1);
    }

    #[tokio::test]
    async fn cleanup_failure_does_not_mask_handshake_error() {
        let script = Script::new();
        {
            let mut state = script.state();
            state.handshake_error = Some(mcp::Error::Closed);
            state.fail_transport_close = true;
        }
        let mut session = session();

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(!session.is_connected());
    }

    #[tokio::test]
    async fn protocol_version_mismatch_is_a_connection_error() {
        let script = Script::new();
        script.state().handshake_error = Some(mcp::Error::Protocol(ProtocolError::new(
            codes::CONNECTION_CLOSED,
            "Server's protocol version is not supported: 1999-01-01",
        )));
        let mut session = session();

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().starts_with("protocol version mismatch"));
    }

    #[tokio::test(start_paused = true)]
    async fn handshake_timeout_is_a_connection_error() {
        let script = Script::new();
        script.state().hang_handshake = true;
        let mut session = session();

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().contains("timeout: 60s"));
        assert!(!session.is_connected());
        assert_eq!(script.state().transports_closed, 1);
    }

    #[tokio::test]
    async fn informationless_handshake_is_rolled_back() {
        let script = Script::new();
        script.state().identity.capabilities = None;
        let mut session = session();

        let err = session.connect(ScriptedTransport::new(&script)).await.unwrap_err();

        assert!(err.is_connection());
        assert!(!session.is_connected());
        let state = script.state();
        assert_eq!(state.peers_closed, 1);
        assert_eq!(state.transports_closed, 1);
    }

    #[tokio::test]
    async fn close_is_idempotent() {
        let script = Script::new();
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();

        session.close().await;
        session.close().await;

        assert!(!session.is_connected());
        let state = script.state();
        assert_eq!(state.peers_closed, 1);
        assert_eq!(state.transports_closed, 1);
    }

    #[tokio::test]
    async fn close_keeps_going_after_peer_failure() {
        let script = Script::new();
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();
        script.state().fail_peer_close = true;

        session.close().await;

        assert!(!session.is_connected());
        assert_eq!(script.state().transports_closed, 1);
    }

    #[tokio::test]
    async fn operations_require_a_session() {
        let session = session();

        let err = session.list_tools(RequestOptions::default()).await.unwrap_err();
        assert!(err.is_connection());

        let err = session
            .call_tool_raw("echo", &Map::new(), None, RequestOptions::default())
            .await
            .unwrap_err();
        assert!(err.is_connection());
        assert!(err.to_string().contains("call connect() first"));
    }

    #[tokio::test]
    async fn list_tools_keeps_server_order() {
        let script = Script::new();
        script.state().tools = vec!["b_tool".into(), "a_tool".into()];
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();

        let tools = session.list_tools(RequestOptions::default()).await.unwrap();

        let names: Vec<_> = tools.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["b_tool", "a_tool"]);
    }

    #[tokio::test]
    async fn execution_error_carries_server_content() {
        let script = Script::new();
        script
            .state()
            .push(Reply::Outcome(CallToolResult::error(vec![ToolContent::text("bad arg")])));
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();

        let err = session
            .call_tool_raw("echo", &args(json!({"msg": "hi"})), None, RequestOptions::default())
            .await
            .unwrap_err();

        match err {
            Error::ToolExecution { tool, content, .. } => {
                assert_eq!(tool, "echo");
                assert_eq!(content, vec![ToolContent::text("bad arg")]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        let state = script.state();
        assert_eq!(state.calls.len(), 1);
        assert_eq!(state.calls[0].arguments, Some(args(json!({"msg": "hi"}))));
    }

    #[tokio::test(start_paused = true)]
    async fn timed_out_attempts_consume_retries() {
        let script = Script::new();
        {
            let mut state = script.state();
            state.push(Reply::Hang);
            state.push(Reply::Outcome(CallToolResult::success(vec![ToolContent::text("{}")])));
        }
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();

        let result = session
            .call_tool_raw(
                "echo",
                &Map::new(),
                Some(RetryPolicy::new(2, Duration::from_millis(10))),
                RequestOptions::with_timeout(Duration::from_secs(5)),
            )
            .await
            .unwrap();

        assert_eq!(result.first_text(), Some("{}"));
        let state = script.state();
        assert_eq!(state.calls.len(), 2);
        assert_eq!(
            state.calls[1].at - state.calls[0].at,
            Duration::from_secs(5) + Duration::from_millis(10)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_on_final_attempt_is_a_connection_error() {
        let script = Script::new();
        script.state().push(Reply::Hang);
        let mut session = session();
        session.connect(ScriptedTransport::new(&script)).await.unwrap();

        let err = session
            .call_tool_raw(
                "echo",
                &Map::new(),
                Some(RetryPolicy::none()),
                RequestOptions::with_timeout(Duration::from_secs(1)),
            )
            .await
            .unwrap_err();

        assert!(err.is_connection());
        assert!(err.to_string().contains("after 1 attempts"));
    }
}
