//! # genui core
//!
//! Domain types, traits, and error definitions for the genui agent runtime.
//! This crate has **no runtime dependencies**: it defines the domain model
//! that the provider, tool, agent and gateway crates implement against.
//!
//! ## Layout
//!
//! - [`tool`]: the `Tool` trait, the registry, and tool outcomes
//! - [`schema`]: structural validation of tool parameters
//! - [`provider`]: the model collaborator
//! - [`message`]: conversation turns and wire messages
//! - [`ui`]: opaque UI fragments pushed to clients

pub mod error;
pub mod message;
pub mod provider;
pub mod schema;
pub mod tool;
pub mod ui;

// Re-export key types at crate root for ergonomics
pub use error::{FieldError, ProviderError, RegistryError, ToolError};
pub use message::{ConversationTurn, Message, MessageToolCall, Role, TurnRole};
pub use provider::{Provider, ProviderRequest, ProviderResponse, ToolDefinition, Usage};
pub use schema::{FieldType, ToolSchema};
pub use tool::{Tool, ToolCall, ToolOutcome, ToolRegistry};
pub use ui::UiFragment;
