//! Run-level error taxonomy.
//!
//! Tool failures never show up here: they are folded into the conversation
//! as error outcomes. Everything in [`AgentError`] ends the run.

use genui_core::error::ProviderError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A fatal failure of one agent run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgentError {
    #[error("Model unavailable: {0}")]
    ModelUnavailable(String),

    #[error("Could not interpret model response: {0}")]
    ModelParse(String),

    #[error("Exceeded the limit of {limit} tool round trips")]
    MaxIterationsExceeded { limit: u32 },

    #[error("Model did not respond within {0}s")]
    Timeout(u64),

    #[error("UI stream misuse: {0}")]
    StreamClosed(String),

    #[error("Run cancelled")]
    Cancelled,
}

impl AgentError {
    pub fn kind(&self) -> RunErrorKind {
        match self {
            Self::ModelUnavailable(_) => RunErrorKind::ModelUnavailable,
            Self::ModelParse(_) => RunErrorKind::ModelParse,
            Self::MaxIterationsExceeded { .. } => RunErrorKind::MaxIterationsExceeded,
            Self::Timeout(_) => RunErrorKind::Timeout,
            Self::StreamClosed(_) => RunErrorKind::StreamClosed,
            Self::Cancelled => RunErrorKind::Cancelled,
        }
    }
}

impl From<ProviderError> for AgentError {
    fn from(err: ProviderError) -> Self {
        match err {
            // The model answered with something we cannot decode.
            ProviderError::InvalidResponse(reason) => Self::ModelParse(reason),
            other => Self::ModelUnavailable(other.to_string()),
        }
    }
}

impl From<StreamError> for AgentError {
    fn from(err: StreamError) -> Self {
        match err {
            StreamError::Closed => Self::StreamClosed(err.to_string()),
            // Nobody is listening any more; treat it like a cancel.
            StreamError::ConsumerGone => Self::Cancelled,
        }
    }
}

/// Machine-readable class of a [`RunError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunErrorKind {
    ModelUnavailable,
    ModelParse,
    MaxIterationsExceeded,
    Timeout,
    StreamClosed,
    Cancelled,
}

/// The error half of a settled run, as delivered to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct RunError {
    pub kind: RunErrorKind,
    pub message: String,
}

impl From<AgentError> for RunError {
    fn from(err: AgentError) -> Self {
        Self {
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Terminal value of a run: the final answer or why there is none.
pub type RunOutcome = Result<String, RunError>;

/// Failures pushing to the UI channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("push after the UI stream was marked done")]
    Closed,

    #[error("UI stream consumer went away")]
    ConsumerGone,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_errors_are_unavailable() {
        let err = AgentError::from(ProviderError::Network("connection refused".into()));
        assert_eq!(err.kind(), RunErrorKind::ModelUnavailable);
        assert!(err.to_string().contains("connection refused"));

        let err = AgentError::from(ProviderError::RateLimited {
            retry_after_secs: 5,
        });
        assert_eq!(err.kind(), RunErrorKind::ModelUnavailable);
    }

    #[test]
    fn undecodable_response_is_parse_error() {
        let err = AgentError::from(ProviderError::InvalidResponse("bad json".into()));
        assert_eq!(err, AgentError::ModelParse("bad json".into()));
    }

    #[test]
    fn stream_errors_map() {
        assert_eq!(
            AgentError::from(StreamError::ConsumerGone),
            AgentError::Cancelled
        );
        assert_eq!(
            AgentError::from(StreamError::Closed).kind(),
            RunErrorKind::StreamClosed
        );
    }

    #[test]
    fn run_error_serialization() {
        let err = RunError::from(AgentError::MaxIterationsExceeded { limit: 8 });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["kind"], "max_iterations_exceeded");
        assert_eq!(json["message"], "Exceeded the limit of 8 tool round trips");
    }
}
