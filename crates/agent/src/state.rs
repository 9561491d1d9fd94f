//! Per-request agent state.

use genui_core::message::ConversationTurn;
use genui_core::tool::{ToolCall, ToolOutcome};

/// Everything one run knows. Created per request, owned by the loop task,
/// dropped when the run settles.
#[derive(Debug, Clone)]
pub struct AgentState {
    pub run_id: String,

    /// The user's message for this run.
    pub input: String,

    /// Prior turns supplied by the caller.
    pub history: Vec<ConversationTurn>,

    /// Turns appended during this run, after `input`.
    pub turns: Vec<ConversationTurn>,

    pub pending_tool_call: Option<ToolCall>,
    pub tool_result: Option<ToolOutcome>,
    pub final_result: Option<String>,

    /// Completed tool round trips.
    pub round_trips: u32,
}

impl AgentState {
    pub fn new(
        run_id: impl Into<String>,
        input: impl Into<String>,
        history: Vec<ConversationTurn>,
    ) -> Self {
        Self {
            run_id: run_id.into(),
            input: input.into(),
            history,
            turns: Vec::new(),
            pending_tool_call: None,
            tool_result: None,
            final_result: None,
            round_trips: 0,
        }
    }

    /// The whole conversation in order: history, input, then this run's turns.
    pub fn conversation(&self) -> impl Iterator<Item = ConversationTurn> + '_ {
        self.history
            .iter()
            .cloned()
            .chain(std::iter::once(ConversationTurn::user(self.input.clone())))
            .chain(self.turns.iter().cloned())
    }

    /// Fold a finished tool call into the conversation and count the round trip.
    pub fn record_tool_round(&mut self, call: &ToolCall, outcome: ToolOutcome) {
        self.turns.push(ConversationTurn::assistant(tool_call_message(call)));
        self.turns
            .push(ConversationTurn::user(tool_result_message(&call.name, &outcome)));
        self.pending_tool_call = None;
        self.tool_result = Some(outcome);
        self.round_trips += 1;
    }
}

/// Assistant turn recorded for a tool call.
pub fn tool_call_message(call: &ToolCall) -> String {
    format!("Calling tool {} with {}", call.name, call.parameters)
}

/// User turn carrying a tool outcome back to the model:
/// `Tool result (<name>): <compact JSON outcome>`.
pub fn tool_result_message(tool: &str, outcome: &ToolOutcome) -> String {
    let json = serde_json::to_string(outcome)
        .unwrap_or_else(|_| r#"{"kind":"error","message":"unserializable tool outcome"}"#.into());
    format!("Tool result ({tool}): {json}")
}
