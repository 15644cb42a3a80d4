//! Typed client for MCP tool servers.
//!
//! The client keeps one session per instance, retries transient failures with
//! exponential backoff, and decodes the JSON text payload of each tool
//! outcome into a caller-chosen type.
//!
//! # Example
//!
//! ```no_run
//! use client::{GoogleSearchArgs, McpClient, RequestOptions};
//!
//! # async fn example() -> client::Result<()> {
//! let mut client = McpClient::builder("http://localhost:3001/mcp").build()?;
//! let info = client.connect().await?;
//! println!("connected to {} {}", info.server_info.name, info.server_info.version);
//!
//! let results = client
//!     .google_search(&GoogleSearchArgs::new("rust async"), RequestOptions::default())
//!     .await;
//! client.close().await;
//!
//! for item in results?.search_results {
//!     println!("{} {}", item.title, item.url);
//! }
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod decode;
mod error;
mod retry;
mod session;
mod tools;

#[cfg(test)]
mod testing;

pub use client::McpClient;
pub use config::{
    ClientBuilder, ClientConfig, DEFAULT_CLIENT_NAME, DEFAULT_CLIENT_VERSION, DEFAULT_TIMEOUT,
    ProtocolOptions, RequestOptions,
};
pub use decode::decode;
pub use error::{BoxError, Error, RawResponse, Result, classify};
pub use retry::{DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, RetryPolicy, is_retryable};
pub use session::{ServerInformation, Session};
pub use tools::*;

pub use mcp::{
    CallToolResult, HttpOptions, Implementation, ServerCapabilities, StreamableHttpTransport, Tool,
    ToolContent,
};
