//! Provider trait: the abstraction over LLM backends.
//!
//! A Provider knows how to send a conversation to an LLM and get a complete
//! response back. The agent crate turns that response into a decision.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::message::Message;

/// One chat completion call: model, transcript and the tools on offer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderRequest {
    pub model: String,

    pub messages: Vec<Message>,

    /// Sampling temperature; the agent loop defaults to 0.0
    #[serde(default)]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Definitions the model may pick from; empty means plain chat
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDefinition>,
}

/// Name, description and argument schema of a callable tool, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,

    /// JSON Schema (`type: object`) for the argument object
    pub parameters: serde_json::Value,
}

/// What a provider returned for one request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub message: Message,

    pub usage: Option<Usage>,

    /// Model name reported by the backend, which can differ from the requested one
    pub model: String,
}

/// Token accounting, when the backend reports it.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// An LLM backend.
///
/// The agent loop calls `complete()` without knowing which backend sits
/// behind it; tests substitute scripted implementations.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Short label used in logs, e.g. "openai".
    fn name(&self) -> &str;

    /// Run one non-streaming completion.
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError>;

    /// Whether the backend is reachable. Defaults to `true`.
    async fn health_check(&self) -> Result<bool, ProviderError> {
        Ok(true)
    }
}
