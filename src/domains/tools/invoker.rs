//! Tool Invoker - runs a handler and normalizes whatever happens.
//!
//! [`ToolInvoker::invoke`] always yields a [`ToolOutcome`]: handler errors,
//! panics and timeouts become failed outcomes and never reach the dispatcher.

use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::Duration;
use tracing::{error, instrument, warn};

use super::{ToolDefinition, ToolOutcome, ValidatedArgs};

/// Default upper bound for a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Executes tools with fault isolation and a time bound.
#[derive(Debug, Clone, Copy)]
pub struct ToolInvoker {
    timeout: Duration,
}

impl Default for ToolInvoker {
    fn default() -> Self {
        Self::new(DEFAULT_TOOL_TIMEOUT)
    }
}

impl ToolInvoker {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    /// Invoke `definition` with already validated arguments.
    #[instrument(skip_all, fields(tool = definition.name()))]
    pub async fn invoke(&self, definition: &ToolDefinition, args: ValidatedArgs) -> ToolOutcome {
        let call = AssertUnwindSafe(definition.handler().call(args)).catch_unwind();

        match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(Ok(outcome))) => {
                if outcome.is_error() {
                    warn!("Tool reported an error: {}", outcome.joined_text());
                }
                outcome
            }
            Ok(Ok(Err(e))) => {
                warn!("Tool failed: {}", e);
                ToolOutcome::error(e.to_string())
            }
            Ok(Err(panic)) => {
                error!("Tool panicked: {}", panic_message(panic.as_ref()));
                ToolOutcome::error(format!("Tool '{}' failed unexpectedly", definition.name()))
            }
            Err(_) => {
                warn!("Tool timed out after {}s", self.timeout.as_secs());
                ToolOutcome::error(format!(
                    "Tool '{}' timed out after {}s",
                    definition.name(),
                    self.timeout.as_secs()
                ))
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("<non-string panic payload>")
}
