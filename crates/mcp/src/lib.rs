//! MCP (Model Context Protocol) protocol boundary.
//!
//! This crate holds the wire data model the client consumes, the
//! [`Transport`]/[`Peer`] traits that separate the client core from any
//! particular protocol runtime, and a streamable HTTP implementation of those
//! traits on top of the official rmcp SDK.
//!
//! # Example
//!
//! ```no_run
//! use mcp::{HttpOptions, Implementation, InitializeParams, Peer, StreamableHttpTransport, Transport};
//!
//! # async fn example() -> mcp::Result<()> {
//! let mut transport = StreamableHttpTransport::new("http://localhost:3001/mcp", HttpOptions::default());
//! let params = InitializeParams::new(Implementation::new("example", "0.1.0"));
//! let peer = transport.handshake(&params).await?;
//!
//! for tool in peer.list_tools().await? {
//!     println!("Tool: {}", tool.name);
//! }
//!
//! peer.close().await?;
//! transport.close().await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod protocol;
mod streamable;
mod transport;

pub use error::{Error, Result};
pub use protocol::{
    CallToolParams, CallToolResult, Implementation, InitializeParams, InitializeResult,
    PromptsCapability, ProtocolError, ResourcesCapability, ServerCapabilities, Tool,
    ToolAnnotations, ToolContent, ToolsCapability, codes,
};
pub use streamable::{HttpOptions, StreamableHttpPeer, StreamableHttpTransport};
pub use transport::{Peer, Transport};
