//! The agent loop: a small state machine driving the two invokers.
//!
//! ```text
//! AwaitingDecision --FinalAnswer--> Done
//! AwaitingDecision --ToolCall-----> ExecutingTool --> AwaitingDecision
//! ```
//!
//! Every run is spawned onto its own task. The caller gets back an
//! [`AgentRun`] with the UI stream, the terminal result, and a cancel handle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use genui_core::message::ConversationTurn;
use genui_core::provider::{Provider, ToolDefinition};
use genui_core::tool::{ToolCall, ToolRegistry};
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::error::{AgentError, RunError, RunOutcome};
use crate::invoker::ToolInvoker;
use crate::model::{Decision, ModelInvoker, ModelSettings};
use crate::state::AgentState;
use crate::stream::{EventEmitter, RunResult, UiEvent, UiSender, UiStream};

const DEFAULT_MAX_ROUND_TRIPS: u32 = 8;
const DEFAULT_MODEL_TIMEOUT: Duration = Duration::from_secs(60);
const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the loop is between transitions.
#[derive(Debug)]
enum LoopState {
    AwaitingDecision,
    ExecutingTool(ToolCall),
    Done(RunOutcome),
}

/// Cancels a run at its next suspension point.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    token: CancellationToken,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancel the run when the returned guard is dropped.
    pub fn drop_guard(self) -> DropGuard {
        self.token.drop_guard()
    }
}

/// Handles for one in-flight run.
pub struct AgentRun {
    pub run_id: String,
    pub ui: UiStream,
    pub result: RunResult,
    pub cancel: CancelHandle,
}

impl AgentRun {
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Drain the UI stream, then wait for the terminal result.
    pub async fn collect(self) -> (Vec<UiEvent>, RunOutcome) {
        use futures::StreamExt;

        let events = self.ui.collect().await;
        (events, self.result.await)
    }
}

/// The core agent loop that orchestrates model calls and tool execution.
#[derive(Clone)]
pub struct AgentLoop {
    model: ModelInvoker,
    tools: ToolInvoker,
    definitions: Arc<Vec<ToolDefinition>>,
    max_round_trips: u32,
}

impl AgentLoop {
    /// Create a new agent loop with default limits.
    pub fn new(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        model: impl Into<String>,
    ) -> Self {
        let definitions = Arc::new(tools.definitions());
        Self {
            model: ModelInvoker::new(
                provider,
                ModelSettings {
                    model: model.into(),
                    temperature: 0.0,
                    max_tokens: None,
                    system_prompt: None,
                },
                DEFAULT_MODEL_TIMEOUT,
            ),
            tools: ToolInvoker::new(tools, DEFAULT_TOOL_TIMEOUT),
            definitions,
            max_round_trips: DEFAULT_MAX_ROUND_TRIPS,
        }
    }

    /// Create an agent loop from the `[provider]` and `[agent]` sections.
    pub fn from_config(
        provider: Arc<dyn Provider>,
        tools: Arc<ToolRegistry>,
        config: &genui_config::AppConfig,
    ) -> Self {
        let mut agent = Self::new(provider, tools, &config.provider.model)
            .with_temperature(config.provider.temperature)
            .with_system_prompt(&config.provider.system_prompt)
            .with_max_round_trips(config.agent.max_round_trips)
            .with_model_timeout(Duration::from_secs(config.agent.model_timeout_secs))
            .with_tool_timeout(Duration::from_secs(config.agent.tool_timeout_secs));
        if let Some(max) = config.provider.max_tokens {
            agent = agent.with_max_tokens(max);
        }
        agent
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.model.settings_mut().temperature = temperature;
        self
    }

    /// Set the default max tokens per model response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.model.settings_mut().max_tokens = Some(max);
        self
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.model.settings_mut().system_prompt = Some(prompt.into());
        self
    }

    /// Set the maximum number of tool round trips per run.
    pub fn with_max_round_trips(mut self, max: u32) -> Self {
        self.max_round_trips = max;
        self
    }

    pub fn with_model_timeout(mut self, timeout: Duration) -> Self {
        self.model.set_timeout(timeout);
        self
    }

    /// Timeout for tools that do not declare their own.
    pub fn with_tool_timeout(mut self, timeout: Duration) -> Self {
        self.tools.set_default_timeout(timeout);
        self
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        self.tools.registry()
    }

    pub fn max_round_trips(&self) -> u32 {
        self.max_round_trips
    }

    /// Start a run. Must be called inside a tokio runtime.
    ///
    /// Never fails: every problem is reported through `AgentRun::result`.
    pub fn invoke(&self, input: impl Into<String>, history: Vec<ConversationTurn>) -> AgentRun {
        let run_id = uuid::Uuid::new_v4().to_string();
        let (emitter, ui, result) = EventEmitter::channel();
        let token = CancellationToken::new();

        let agent = self.clone();
        let mut state = AgentState::new(&run_id, input, history);
        let cancel = token.clone();
        let span = info_span!("agent_run", run_id = %run_id);

        tokio::spawn(
            async move {
                info!(
                    input_len = state.input.len(),
                    history = state.history.len(),
                    "Run started"
                );
                let started = Instant::now();

                let outcome = tokio::select! {
                    biased;

                    () = cancel.cancelled() => Err(RunError::from(AgentError::Cancelled)),
                    outcome = agent.drive(&mut state, emitter.ui()) => outcome,
                };

                let duration_ms = started.elapsed().as_millis() as u64;
                match &outcome {
                    Ok(answer) => info!(
                        round_trips = state.round_trips,
                        duration_ms,
                        answer_len = answer.len(),
                        "Run finished"
                    ),
                    Err(err) => warn!(
                        round_trips = state.round_trips,
                        duration_ms,
                        kind = ?err.kind,
                        error = %err,
                        "Run failed"
                    ),
                }

                emitter.finish(outcome);
            }
            .instrument(span),
        );

        AgentRun {
            run_id,
            ui,
            result,
            cancel: CancelHandle { token },
        }
    }

    /// Run the state machine until it settles.
    async fn drive(&self, state: &mut AgentState, ui: &UiSender) -> RunOutcome {
        let mut current = LoopState::AwaitingDecision;
        loop {
            current = match current {
                LoopState::AwaitingDecision => self.decide(state).await,
                LoopState::ExecutingTool(call) => match self.tools.invoke(&call, ui).await {
                    Ok(outcome) => {
                        state.record_tool_round(&call, outcome);
                        LoopState::AwaitingDecision
                    }
                    Err(err) => LoopState::Done(Err(AgentError::from(err).into())),
                },
                LoopState::Done(outcome) => return outcome,
            };
        }
    }

    async fn decide(&self, state: &mut AgentState) -> LoopState {
        match self.model.decide(state, &self.definitions).await {
            Ok(Decision::FinalAnswer(answer)) => {
                state.final_result = Some(answer.clone());
                LoopState::Done(Ok(answer))
            }
            Ok(Decision::ToolCall(_)) if state.round_trips >= self.max_round_trips => {
                warn!(limit = self.max_round_trips, "Tool round trip limit reached");
                LoopState::Done(Err(AgentError::MaxIterationsExceeded {
                    limit: self.max_round_trips,
                }
                .into()))
            }
            Ok(Decision::ToolCall(call)) => {
                debug!(
                    tool = %call.name,
                    round_trip = state.round_trips + 1,
                    "Executing tool call"
                );
                state.pending_tool_call = Some(call.clone());
                LoopState::ExecutingTool(call)
            }
            Err(err) => LoopState::Done(Err(err.into())),
        }
    }
}
