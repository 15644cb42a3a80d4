//! Transport and peer traits.
//!
//! A [`Transport`] is a not-yet-initialized channel to one server. Running the
//! `initialize` handshake over it yields a [`Peer`], the protocol handle used
//! for every later request. The client core only ever talks to these traits.

use std::future::Future;

use crate::error::Result;
use crate::protocol::{CallToolParams, CallToolResult, InitializeParams, InitializeResult, Tool};

/// A channel to a single MCP server.
pub trait Transport: Send + Sync {
    /// Protocol handle produced by a successful handshake.
    type Peer: Peer;

    /// Run the `initialize` handshake.
    fn handshake(
        &mut self,
        params: &InitializeParams,
    ) -> impl Future<Output = Result<Self::Peer>> + Send;

    /// Release the transport. Called after the peer is closed, or after a
    /// failed handshake.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}

/// An initialized protocol session.
pub trait Peer: Send + Sync {
    /// What the server reported during the handshake, if it is still known.
    fn server_info(&self) -> Option<InitializeResult>;

    /// List the server's tools, in server order.
    fn list_tools(&self) -> impl Future<Output = Result<Vec<Tool>>> + Send;

    /// Invoke a tool once.
    fn call_tool(&self, params: CallToolParams)
    -> impl Future<Output = Result<CallToolResult>> + Send;

    /// Shut the protocol session down.
    fn close(self) -> impl Future<Output = Result<()>> + Send;
}
