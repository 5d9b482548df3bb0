//! Greeting tool.

use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;

use crate::domains::tools::{
    Schema, ToolDefinition, ToolError, ToolHandler, ToolOutcome, ValidatedArgs,
};

/// Name used when none is given.
const DEFAULT_NAME: &str = "World";

/// Parameters for the greet tool.
#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct GreetParams {
    /// Who to greet. May be omitted, but not `null`.
    #[serde(default)]
    #[schemars(description = "Name of the person to greet (defaults to \"World\")")]
    pub name: String,
}

/// Returns a friendly greeting.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreetTool;

impl GreetTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "greet";

    pub const TITLE: &'static str = "Greet";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Return a friendly greeting";

    /// Build the greeting. An absent or empty name greets the world.
    pub fn execute(params: &GreetParams) -> ToolOutcome {
        let name = match params.name.as_str() {
            "" => DEFAULT_NAME,
            name => name,
        };
        ToolOutcome::text(format!("Hello, {name}!"))
    }

    /// Registry entry for this tool.
    pub fn definition() -> ToolDefinition {
        ToolDefinition::new(
            Self::NAME,
            Self::DESCRIPTION,
            Schema::for_type::<GreetParams>(),
            Arc::new(Self),
        )
        .with_title(Self::TITLE)
    }
}

#[async_trait::async_trait]
impl ToolHandler for GreetTool {
    async fn call(&self, args: ValidatedArgs) -> Result<ToolOutcome, ToolError> {
        let params: GreetParams = args.parse()?;
        Ok(Self::execute(&params))
    }
}
