//! Tool invoker: validates, executes, and reports one tool call.
//!
//! Tool failures come back as [`ToolOutcome::Error`]; the only error this
//! returns is a UI channel failure, which the loop treats as fatal.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use genui_core::error::ToolError;
use genui_core::tool::{Tool, ToolCall, ToolOutcome, ToolRegistry};
use genui_core::ui::UiFragment;
use tracing::{info, warn};

use crate::error::StreamError;
use crate::stream::{UiEvent, UiEventKind, UiOp, UiSender};

#[derive(Clone)]
pub struct ToolInvoker {
    registry: Arc<ToolRegistry>,
    default_timeout: Duration,
}

impl ToolInvoker {
    pub fn new(registry: Arc<ToolRegistry>, default_timeout: Duration) -> Self {
        Self {
            registry,
            default_timeout,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub(crate) fn set_default_timeout(&mut self, timeout: Duration) {
        self.default_timeout = timeout;
    }

    /// Run `call`, publishing its progress on `ui`.
    ///
    /// Event sequence per call: either a single error append (unknown tool
    /// or invalid parameters), or a loading append followed by exactly one
    /// result or error update under the same fragment id.
    pub async fn invoke(&self, call: &ToolCall, ui: &UiSender) -> Result<ToolOutcome, StreamError> {
        let id = uuid::Uuid::new_v4().to_string();

        let tool = match self.registry.lookup(&call.name) {
            Ok(tool) => tool,
            Err(_) => {
                let err = ToolError::Unknown(call.name.clone());
                warn!(tool = %call.name, "Model requested an unknown tool");
                let fragment = UiFragment::error(&call.name, &err.to_string());
                return reject(ui, id, &call.name, fragment, &err);
            }
        };

        let parameters = match tool.input_schema().validate(&call.parameters) {
            Ok(parameters) => parameters,
            Err(errors) => {
                let err = ToolError::InvalidParameters {
                    tool: call.name.clone(),
                    errors,
                };
                warn!(tool = %call.name, error = %err, "Rejected tool parameters");
                let fragment = tool.error_fragment(&err.to_string());
                return reject(ui, id, &call.name, fragment, &err);
            }
        };

        ui.push(UiEvent {
            id: id.clone(),
            kind: UiEventKind::Loading,
            op: UiOp::Append,
            tool: call.name.clone(),
            fragment: tool.loading_fragment(&parameters),
        })?;

        let started = Instant::now();
        let result = self.execute(tool.as_ref(), parameters).await;
        let duration_ms = started.elapsed().as_millis() as u64;

        let (kind, fragment, outcome) = match result {
            Ok(value) => {
                info!(tool = %call.name, duration_ms, "Tool succeeded");
                (
                    UiEventKind::Result,
                    tool.result_fragment(&value),
                    ToolOutcome::success(value),
                )
            }
            Err(err) => {
                warn!(
                    tool = %call.name,
                    duration_ms,
                    kind = err.kind(),
                    error = %err,
                    "Tool failed"
                );
                (
                    UiEventKind::Error,
                    tool.error_fragment(&err.to_string()),
                    ToolOutcome::from(&err),
                )
            }
        };

        ui.push(UiEvent {
            id,
            kind,
            op: UiOp::Update,
            tool: call.name.clone(),
            fragment,
        })?;

        Ok(outcome)
    }

    /// Execute under the tool's time limit. A panic inside the tool is
    /// reported as an execution failure; release builds abort instead.
    async fn execute(
        &self,
        tool: &dyn Tool,
        parameters: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let limit = tool.timeout().unwrap_or(self.default_timeout);
        let guarded = AssertUnwindSafe(tool.execute(parameters)).catch_unwind();
        match tokio::time::timeout(limit, guarded).await {
            Ok(Ok(result)) => result,
            Ok(Err(payload)) => Err(ToolError::ExecutionFailed {
                tool_name: tool.name().to_string(),
                reason: format!("panicked: {}", panic_message(&*payload)),
            }),
            Err(_) => Err(ToolError::Timeout {
                tool_name: tool.name().to_string(),
                timeout_secs: limit.as_secs(),
            }),
        }
    }
}

/// Report a call that never reached `execute`.
fn reject(
    ui: &UiSender,
    id: String,
    tool: &str,
    fragment: UiFragment,
    err: &ToolError,
) -> Result<ToolOutcome, StreamError> {
    ui.push(UiEvent {
        id,
        kind: UiEventKind::Error,
        op: UiOp::Append,
        tool: tool.to_string(),
        fragment,
    })?;
    Ok(ToolOutcome::from(err))
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "unknown panic"
    }
}
