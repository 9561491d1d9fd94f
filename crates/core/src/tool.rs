//! Tool trait: the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world:
//! look up a repository, fetch the weather, scrape a page, draw a picture.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{RegistryError, ToolError};
use crate::provider::ToolDefinition;
use crate::schema::ToolSchema;
use crate::ui::UiFragment;

/// A request to execute a tool, as decided by the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Name of the tool to execute
    pub name: String,

    /// Parameters as a JSON value
    pub parameters: serde_json::Value,
}

impl ToolCall {
    pub fn new(name: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            parameters,
        }
    }
}

/// The result of one tool invocation, always carried as data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ToolOutcome {
    Success { value: serde_json::Value },
    Error { message: String },
}

impl ToolOutcome {
    pub fn success(value: serde_json::Value) -> Self {
        Self::Success { value }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }
}

impl From<&ToolError> for ToolOutcome {
    fn from(err: &ToolError) -> Self {
        Self::error(err.to_string())
    }
}

/// The core Tool trait.
///
/// Each tool (github_repo, get_weather, get_web_data, ...) implements this
/// trait and is registered once at startup. `execute` receives parameters
/// that already passed [`Tool::input_schema`] validation.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "get_weather").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the LLM).
    fn description(&self) -> &str;

    /// Structural schema for the parameters.
    fn input_schema(&self) -> ToolSchema;

    /// Execute the tool with validated parameters.
    async fn execute(&self, parameters: serde_json::Value) -> Result<serde_json::Value, ToolError>;

    /// Per-tool execution timeout. `None` uses the agent-wide default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Fragment appended to the UI before `execute` starts.
    fn loading_fragment(&self, _parameters: &serde_json::Value) -> UiFragment {
        UiFragment::loading(self.name())
    }

    /// Fragment that replaces the loading fragment on success.
    fn result_fragment(&self, value: &serde_json::Value) -> UiFragment {
        UiFragment::new("ToolResult", value.clone())
    }

    /// Fragment that replaces the loading fragment on failure.
    fn error_fragment(&self, message: &str) -> UiFragment {
        UiFragment::error(self.name(), message)
    }

    /// Convert this tool into a ToolDefinition for sending to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.input_schema().to_json_schema(),
        }
    }
}

/// A registry of available tools.
///
/// Populated once at startup and then shared read-only behind an `Arc`:
/// 1. Tool definitions are sent to the LLM
/// 2. Tool calls requested by the LLM are resolved by name
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Names are unique.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), RegistryError> {
        let name = tool.name().to_string();
        if self.tools.contains_key(&name) {
            return Err(RegistryError::Duplicate(name));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn lookup(&self, name: &str) -> Result<Arc<dyn Tool>, RegistryError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))
    }

    /// All tool definitions, sorted by name so requests are stable.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<_> = self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<_> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
