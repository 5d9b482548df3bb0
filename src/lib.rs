//! Hello MCP Server Library
//!
//! A small, stateless Model Context Protocol (MCP) server that exposes tools
//! over JSON-RPC 2.0 on HTTP.
//!
//! # Architecture
//!
//! - **core**: configuration, error handling, the JSON-RPC protocol layer,
//!   server assembly and the HTTP transport
//! - **domains**: business logic organized by bounded contexts
//!   - **tools**: the tool registry, argument schemas, fault-isolated
//!     invocation and the tool definitions themselves
//!
//! Every request is handled independently. The tool registry is built once
//! at startup and only read afterwards.
//!
//! # Example
//!
//! ```rust,no_run
//! use hello_mcp_server::core::{Config, HttpTransport, McpServer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let transport = HttpTransport::new(config.http.clone());
//!     let server = McpServer::new(config)?;
//!     transport.run(server).await?;
//!     Ok(())
//! }
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result};
