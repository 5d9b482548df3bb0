//! Transport layer for the MCP server.
//!
//! The server speaks JSON-RPC over stateless HTTP: every POST to the protocol
//! endpoint is dispatched on its own, with no session carried between
//! requests. Message processing is delegated to the [`McpServer`](crate::core::McpServer).

mod config;
mod error;
pub mod http;

pub use config::HttpConfig;
pub use error::{TransportError, TransportResult};
pub use http::HttpTransport;
