//! Scripted in-memory transport for exercising the client without a server.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use mcp::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult, Peer,
    ServerCapabilities, Tool, ToolsCapability, Transport,
};
use serde_json::{Map, Value, json};
use tokio::time::Instant;

/// What the scripted server does with the next tool call.
pub(crate) enum Reply {
    Outcome(CallToolResult),
    Fail(mcp::Error),
    /// Never answers; only a timeout gets the caller out.
    Hang,
}

/// A recorded tool call.
pub(crate) struct Call {
    pub name: String,
    pub arguments: Option<Map<String, Value>>,
    pub at: Instant,
}

pub(crate) struct ScriptState {
    pub identity: InitializeResult,
    pub handshake_error: Option<mcp::Error>,
    pub hang_handshake: bool,
    pub forget_identity: bool,
    pub fail_peer_close: bool,
    pub fail_transport_close: bool,
    pub tools: Vec<String>,
    pub replies: VecDeque<Reply>,
    pub calls: Vec<Call>,
    pub handshakes: usize,
    pub peers_closed: usize,
    pub transports_closed: usize,
}

impl ScriptState {
    pub fn push(&mut self, reply: Reply) {
        self.replies.push_back(reply);
    }
}

/// Shared handle to a script; every transport built from it reports back here.
#[derive(Clone)]
pub(crate) struct Script(Arc<Mutex<ScriptState>>);

impl Script {
    pub fn new() -> Self {
        let identity = InitializeResult {
            protocol_version: Some("2025-03-26".into()),
            capabilities: Some(ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
                ..ServerCapabilities::default()
            }),
            server_info: Some(Implementation::new("scripted", "1.0.0")),
            instructions: Some("be nice".into()),
        };

        Self(Arc::new(Mutex::new(ScriptState {
            identity,
            handshake_error: None,
            hang_handshake: false,
            forget_identity: false,
            fail_peer_close: false,
            fail_transport_close: false,
            tools: Vec::new(),
            replies: VecDeque::new(),
            calls: Vec::new(),
            handshakes: 0,
            peers_closed: 0,
            transports_closed: 0,
        })))
    }

    pub fn state(&self) -> MutexGuard<'_, ScriptState> {
        self.0.lock().unwrap()
    }
}

pub(crate) struct ScriptedTransport {
    script: Script,
}

impl ScriptedTransport {
    pub fn new(script: &Script) -> Self {
        Self {
            script: script.clone(),
        }
    }
}

impl Transport for ScriptedTransport {
    type Peer = ScriptedPeer;

    async fn handshake(&mut self, _params: &InitializeParams) -> mcp::Result<ScriptedPeer> {
        let hang = {
            let mut state = self.script.state();
            state.handshakes += 1;
            if let Some(err) = state.handshake_error.take() {
                return Err(err);
            }
            state.hang_handshake
        };
        if hang {
            std::future::pending::<()>().await;
        }

        let identity = self.script.state().identity.clone();
        Ok(ScriptedPeer {
            script: self.script.clone(),
            identity,
        })
    }

    async fn close(self) -> mcp::Result<()> {
        let mut state = self.script.state();
        state.transports_closed += 1;
        if state.fail_transport_close {
            return Err(mcp::Error::Transport("transport close failed".into()));
        }
        Ok(())
    }
}

pub(crate) struct ScriptedPeer {
    script: Script,
    identity: InitializeResult,
}

impl Peer for ScriptedPeer {
    fn server_info(&self) -> Option<InitializeResult> {
        if self.script.state().forget_identity {
            return None;
        }
        Some(self.identity.clone())
    }

    async fn list_tools(&self) -> mcp::Result<Vec<Tool>> {
        let names = self.script.state().tools.clone();
        Ok(names
            .into_iter()
            .map(|name| Tool {
                name,
                title: None,
                description: None,
                input_schema: json!({"type": "object"}),
                annotations: None,
            })
            .collect())
    }

    async fn call_tool(&self, params: CallToolParams) -> mcp::Result<CallToolResult> {
        let reply = {
            let mut state = self.script.state();
            state.calls.push(Call {
                name: params.name,
                arguments: params.arguments,
                at: Instant::now(),
            });
            state.replies.pop_front()
        };

        match reply {
            Some(Reply::Outcome(result)) => Ok(result),
            Some(Reply::Fail(err)) => Err(err),
            Some(Reply::Hang) => std::future::pending().await,
            None => Err(mcp::Error::Closed),
        }
    }

    async fn close(self) -> mcp::Result<()> {
        let mut state = self.script.state();
        state.peers_closed += 1;
        if state.fail_peer_close {
            return Err(mcp::Error::Transport("session close failed".into()));
        }
        Ok(())
    }
}
