//! Error types and handling for the MCP server.
//!
//! This module defines the crate-wide error type used during startup.
//! Errors raised while serving a request never use it: they are either
//! JSON-RPC errors or failed tool outcomes. Transport failures have their
//! own [`TransportError`](super::transport::TransportError).

use thiserror::Error;

use crate::domains::tools::RegistryError;

/// A specialized Result type for MCP server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the MCP server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error raised while building the tool registry.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
