//! UI fragments: opaque display units pushed to the client.
//!
//! The core never renders anything. A fragment names a client-side
//! component and carries the props to render it with; the frontend owns
//! the mapping from component name to markup.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiFragment {
    /// Client component name (e.g. "CurrentWeather").
    pub component: String,

    /// Props for the component.
    #[serde(default)]
    pub props: serde_json::Value,
}

impl UiFragment {
    pub fn new(component: impl Into<String>, props: serde_json::Value) -> Self {
        Self {
            component: component.into(),
            props,
        }
    }

    /// Generic spinner shown while a tool without its own loading view runs.
    pub fn loading(tool: &str) -> Self {
        Self::new("ToolLoading", serde_json::json!({ "tool": tool }))
    }

    /// Generic error box.
    pub fn error(tool: &str, message: &str) -> Self {
        Self::new(
            "ToolError",
            serde_json::json!({ "tool": tool, "message": message }),
        )
    }
}
