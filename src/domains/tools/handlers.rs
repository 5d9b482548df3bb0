//! Tool handler seam.
//!
//! A handler receives validated arguments and returns a [`ToolOutcome`].
//! Business failures (bad upstream status, unparsable payload, ...) are
//! returned as `Ok(ToolOutcome::Error(..))`. Returning `Err` or panicking is
//! treated as an unexpected fault by the invoker.

use super::{ToolError, ToolOutcome, ValidatedArgs};

/// Trait implemented by every tool.
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Execute the tool with the given arguments.
    async fn call(&self, args: ValidatedArgs) -> Result<ToolOutcome, ToolError>;
}
