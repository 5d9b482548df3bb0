//! Tool Registry - central registration and lookup for all tools.
//!
//! The registry is filled once at startup (see [`register_all_tools`]) and then
//! shared behind an `Arc` without any interior mutability, so concurrent
//! requests read it without synchronization.

use serde_json::{Value, json};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

use crate::core::config::Config;
use crate::core::error::Result;

use super::definitions::{FetchExternalDataTool, GreetTool};
use super::{RegistryError, Schema, ToolHandler};

/// A named, invocable tool.
#[derive(Clone)]
pub struct ToolDefinition {
    name: String,
    title: Option<String>,
    description: String,
    input_schema: Schema,
    handler: Arc<dyn ToolHandler>,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        input_schema: Schema,
        handler: Arc<dyn ToolHandler>,
    ) -> Self {
        Self {
            name: name.into(),
            title: None,
            description: description.into(),
            input_schema,
            handler,
        }
    }

    /// Set the human-readable title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn input_schema(&self) -> &Schema {
        &self.input_schema
    }

    pub fn handler(&self) -> &dyn ToolHandler {
        self.handler.as_ref()
    }

    /// Metadata entry for `tools/list`.
    pub fn to_listing(&self) -> Value {
        let mut entry = json!({
            "name": self.name,
            "description": self.description,
            "inputSchema": self.input_schema.to_json_schema(),
        });
        if let Some(title) = &self.title {
            entry["title"] = json!(title);
        }
        entry
    }
}

impl fmt::Debug for ToolDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolDefinition")
            .field("name", &self.name)
            .field("title", &self.title)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish_non_exhaustive()
    }
}

/// Tool registry - manages all available tools.
#[derive(Debug, Default)]
pub struct ToolRegistry {
    tools: Vec<ToolDefinition>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names must be unique.
    pub fn register(&mut self, definition: ToolDefinition) -> std::result::Result<(), RegistryError> {
        if self.index.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateName(definition.name().to_string()));
        }
        debug!("Registering tool: {}", definition.name());
        self.index
            .insert(definition.name().to_string(), self.tools.len());
        self.tools.push(definition);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> std::result::Result<&ToolDefinition, RegistryError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// All tools, in registration order.
    pub fn definitions(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Get all tool names.
    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(ToolDefinition::name).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

/// Build the registry with every tool this server exposes.
///
/// When adding a new tool, register it here.
pub fn register_all_tools(config: &Config) -> Result<ToolRegistry> {
    let mut registry = ToolRegistry::new();
    registry.register(GreetTool::definition())?;
    registry.register(FetchExternalDataTool::new(&config.upstream)?.definition())?;
    Ok(registry)
}
