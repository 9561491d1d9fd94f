//! The agent loop: a model/tool cycle that streams UI events per run.
//!
//! Each run follows a **Decide → Act → Observe** cycle:
//!
//! 1. **Render** the system prompt, caller history, and input
//! 2. **Ask the model** for a decision via the configured provider
//! 3. **If a tool call**: validate, execute, push loading/result events,
//!    fold the outcome into the conversation, and loop back to step 2
//! 4. **If text**: close the UI stream and resolve the run with the answer
//!
//! The loop stops on a final answer, a fatal error, cancellation, or when
//! the tool round trip limit is reached.

pub mod error;
pub mod invoker;
pub mod loop_runner;
pub mod model;
pub mod state;
pub mod stream;

#[cfg(test)]
mod test_helpers;

pub use error::{AgentError, RunError, RunErrorKind, RunOutcome, StreamError};
pub use invoker::ToolInvoker;
pub use loop_runner::{AgentLoop, AgentRun, CancelHandle};
pub use model::{Decision, ModelInvoker, ModelSettings, parse_decision};
pub use state::{AgentState, tool_result_message};
pub use stream::{EventEmitter, RunResult, UiEvent, UiEventKind, UiOp, UiSender, UiStream};
