//! MCP Server assembly.
//!
//! [`McpServer`] owns everything that lives for the whole process: the
//! configuration and the tool registry. Both are built once in
//! [`McpServer::new`] and only read afterwards; cloning the server is cheap
//! and shares them.

use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::error::Result;
use super::protocol::{Dispatcher, JsonRpcResponse};
use crate::domains::tools::{ToolInvoker, ToolRegistry, register_all_tools};

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Request dispatcher over the immutable tool registry.
    dispatcher: Arc<Dispatcher>,
}

impl McpServer {
    /// Create a new MCP server with the given configuration.
    ///
    /// Registers every tool; the registry is complete before this returns.
    pub fn new(config: Config) -> Result<Self> {
        let registry = register_all_tools(&config)?;
        Ok(Self::with_registry(config, registry))
    }

    /// Create a server over an explicit set of tools.
    pub fn with_registry(config: Config, registry: ToolRegistry) -> Self {
        info!(
            "Registered {} tools: {}",
            registry.len(),
            registry.names().join(", ")
        );

        let dispatcher = Dispatcher::new(
            Arc::new(registry),
            ToolInvoker::new(config.tools.timeout),
            config.server.clone(),
        );

        Self {
            config: Arc::new(config),
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Handle one raw JSON-RPC request body.
    pub async fn handle_message(&self, body: &[u8]) -> Option<JsonRpcResponse> {
        self.dispatcher.dispatch(body).await
    }
}
