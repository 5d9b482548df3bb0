//! Tool-specific error types.

use thiserror::Error;

/// Faults raised by a tool handler.
///
/// The invoker converts these into a failed [`ToolOutcome`](super::ToolOutcome);
/// they never reach the protocol layer.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Arguments passed validation but could not be read by the handler.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool execution failed.
    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    /// An internal error occurred.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ToolError {
    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }

    /// Create a new "execution failed" error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new "internal" error.
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Errors raised by the tool registry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// A tool with this name is already registered.
    #[error("Tool already registered: {0}")]
    DuplicateName(String),

    /// No tool with this name is registered.
    #[error("Tool not found: {0}")]
    NotFound(String),
}
