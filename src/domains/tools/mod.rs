//! Tools domain module.
//!
//! Tools are named functions that MCP clients invoke through `tools/call`.
//!
//! ## Architecture
//!
//! - `definitions/` - Individual tool implementations (one file per tool)
//! - `registry.rs` - Tool definitions and the startup-built registry
//! - `schema.rs` - Input schemas and argument validation
//! - `invoker.rs` - Fault-isolated, time-bounded handler execution
//! - `outcome.rs` - Normalized tool results
//! - `error.rs` - Tool-specific error types
//!
//! ## Adding a New Tool
//!
//! 1. Create a new file in `definitions/` (e.g., `my_tool.rs`)
//! 2. Define a params struct deriving `JsonSchema` and implement `ToolHandler`
//! 3. Export it in `definitions/mod.rs`
//! 4. Register it in `registry.rs` (`register_all_tools`)

pub mod definitions;
mod error;
mod handlers;
mod invoker;
mod outcome;
mod registry;
mod schema;

pub use error::{RegistryError, ToolError};
pub use handlers::ToolHandler;
pub use invoker::{DEFAULT_TOOL_TIMEOUT, ToolInvoker};
pub use outcome::{ContentBlock, ToolOutcome};
pub use registry::{ToolDefinition, ToolRegistry, register_all_tools};
pub use schema::{FieldSpec, FieldType, Schema, ValidatedArgs, ValidationError};
