//! Model invoker: one model call per decision.
//!
//! Renders the agent state into a provider request and turns the response
//! into a [`Decision`]. Never touches the UI channel.

use std::sync::Arc;
use std::time::Duration;

use genui_core::message::{Message, MessageToolCall};
use genui_core::provider::{Provider, ProviderRequest, ToolDefinition};
use genui_core::tool::ToolCall;
use tracing::{debug, warn};

use crate::error::AgentError;
use crate::state::AgentState;

/// What the model wants to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum Decision {
    FinalAnswer(String),
    ToolCall(ToolCall),
}

/// Request settings sent with every model call.
#[derive(Debug, Clone)]
pub struct ModelSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub system_prompt: Option<String>,
}

#[derive(Clone)]
pub struct ModelInvoker {
    provider: Arc<dyn Provider>,
    settings: ModelSettings,
    timeout: Duration,
}

impl ModelInvoker {
    pub fn new(provider: Arc<dyn Provider>, settings: ModelSettings, timeout: Duration) -> Self {
        Self {
            provider,
            settings,
            timeout,
        }
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }

    pub(crate) fn settings_mut(&mut self) -> &mut ModelSettings {
        &mut self.settings
    }

    pub(crate) fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    /// Messages for the current state: system prompt, then the conversation.
    pub fn render(&self, state: &AgentState) -> Vec<Message> {
        let mut messages = Vec::with_capacity(state.history.len() + state.turns.len() + 2);
        if let Some(prompt) = &self.settings.system_prompt {
            messages.push(Message::system(prompt));
        }
        messages.extend(state.conversation().map(|turn| Message::from(&turn)));
        messages
    }

    /// Ask the model for the next decision.
    pub async fn decide(
        &self,
        state: &AgentState,
        tools: &[ToolDefinition],
    ) -> Result<Decision, AgentError> {
        let request = ProviderRequest {
            model: self.settings.model.clone(),
            messages: self.render(state),
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
            tools: tools.to_vec(),
        };

        debug!(
            run_id = %state.run_id,
            provider = self.provider.name(),
            messages = request.messages.len(),
            round_trip = state.round_trips,
            "Requesting model decision"
        );

        let response = tokio::time::timeout(self.timeout, self.provider.complete(request))
            .await
            .map_err(|_| AgentError::Timeout(self.timeout.as_secs()))??;

        if let Some(usage) = &response.usage {
            debug!(
                run_id = %state.run_id,
                model = %response.model,
                total_tokens = usage.total_tokens,
                "Model responded"
            );
        }

        parse_decision(&response.message)
    }
}

/// Interpret one assistant message.
///
/// The first tool call wins; further calls in the same response are ignored.
pub fn parse_decision(message: &Message) -> Result<Decision, AgentError> {
    if let Some(first) = message.tool_calls.first() {
        if message.tool_calls.len() > 1 {
            warn!(
                requested = message.tool_calls.len(),
                used = %first.name,
                "Model requested several tool calls; only the first is executed"
            );
        }
        return tool_call(first).map(Decision::ToolCall);
    }

    if message.content.trim().is_empty() {
        return Err(AgentError::ModelParse("no tool call or result".into()));
    }

    Ok(Decision::FinalAnswer(message.content.clone()))
}

fn tool_call(call: &MessageToolCall) -> Result<ToolCall, AgentError> {
    if call.name.trim().is_empty() {
        return Err(AgentError::ModelParse("tool call without a name".into()));
    }

    let parameters = if call.arguments.trim().is_empty() {
        serde_json::Value::Object(Default::default())
    } else {
        serde_json::from_str::<serde_json::Value>(&call.arguments).map_err(|e| {
            AgentError::ModelParse(format!("arguments for {} are not valid JSON: {e}", call.name))
        })?
    };

    if !parameters.is_object() {
        return Err(AgentError::ModelParse(format!(
            "arguments for {} must be a JSON object",
            call.name
        )));
    }

    Ok(ToolCall::new(call.name.clone(), parameters))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use genui_core::error::ProviderError;
    use genui_core::message::{ConversationTurn, Role};
    use serde_json::json;

    fn settings() -> ModelSettings {
        ModelSettings {
            model: "mock-model".into(),
            temperature: 0.0,
            max_tokens: None,
            system_prompt: Some("You are helpful.".into()),
        }
    }

    fn tool_message(calls: Vec<MessageToolCall>) -> Message {
        let mut msg = Message::assistant("");
        msg.tool_calls = calls;
        msg
    }

    #[test]
    fn text_is_final_answer() {
        let decision = parse_decision(&Message::assistant("It is sunny.")).unwrap();
        assert_eq!(decision, Decision::FinalAnswer("It is sunny.".into()));
    }

    #[test]
    fn empty_text_without_tool_is_parse_error() {
        let err = parse_decision(&Message::assistant("  ")).unwrap_err();
        assert_eq!(err, AgentError::ModelParse("no tool call or result".into()));
    }

    #[test]
    fn first_tool_call_wins() {
        let msg = tool_message(vec![
            make_tool_call("get_weather", json!({"city": "Austin", "state": "TX"})),
            make_tool_call("github_repo", json!({"owner": "a", "repo": "b"})),
        ]);
        match parse_decision(&msg).unwrap() {
            Decision::ToolCall(call) => {
                assert_eq!(call.name, "get_weather");
                assert_eq!(call.parameters["city"], "Austin");
            }
            other => panic!("expected tool call, got {other:?}"),
        }
    }

    #[test]
    fn empty_arguments_are_empty_object() {
        let msg = tool_message(vec![MessageToolCall {
            id: "call_1".into(),
            name: "dalle_image".into(),
            arguments: String::new(),
        }]);
        assert_eq!(
            parse_decision(&msg).unwrap(),
            Decision::ToolCall(ToolCall::new("dalle_image", json!({})))
        );
    }

    #[test]
    fn malformed_arguments_are_parse_error() {
        for args in ["{not json", "[1,2]", "\"Austin\""] {
            let msg = tool_message(vec![MessageToolCall {
                id: "call_1".into(),
                name: "get_weather".into(),
                arguments: args.into(),
            }]);
            assert!(
                matches!(parse_decision(&msg), Err(AgentError::ModelParse(_))),
                "{args}"
            );
        }
    }

    #[test]
    fn render_orders_system_history_input_turns() {
        let invoker = ModelInvoker::new(
            Arc::new(ScriptedProvider::new(vec![])),
            settings(),
            Duration::from_secs(60),
        );
        let mut state = AgentState::new(
            "run",
            "and now?",
            vec![ConversationTurn::user("hi"), ConversationTurn::assistant("hello")],
        );
        state.turns.push(ConversationTurn::assistant("Calling tool x with {}"));

        let messages = invoker.render(&state);
        let roles: Vec<_> = messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User, Role::Assistant]
        );
        assert_eq!(messages[3].content, "and now?");
    }

    #[tokio::test]
    async fn transport_failure_is_model_unavailable() {
        let provider = ScriptedProvider::from_results(vec![Err(ProviderError::Network(
            "connection reset".into(),
        ))]);
        let invoker = ModelInvoker::new(Arc::new(provider), settings(), Duration::from_secs(60));
        let err = invoker
            .decide(&AgentState::new("run", "hi", vec![]), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ModelUnavailable(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let provider = ScriptedProvider::new(vec![make_text_response("late")])
            .with_delay(Duration::from_secs(120));
        let invoker = ModelInvoker::new(Arc::new(provider), settings(), Duration::from_secs(60));
        let err = invoker
            .decide(&AgentState::new("run", "hi", vec![]), &[])
            .await
            .unwrap_err();
        assert_eq!(err, AgentError::Timeout(60));
    }

    #[tokio::test]
    async fn request_carries_settings_and_tools() {
        let provider = Arc::new(ScriptedProvider::new(vec![make_text_response("ok")]));
        let invoker = ModelInvoker::new(provider.clone(), settings(), Duration::from_secs(60));
        let tools = vec![genui_core::provider::ToolDefinition {
            name: "get_weather".into(),
            description: "weather".into(),
            parameters: json!({"type": "object"}),
        }];
        invoker
            .decide(&AgentState::new("run", "hi", vec![]), &tools)
            .await
            .unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].model, "mock-model");
        assert_eq!(requests[0].tools.len(), 1);
        assert_eq!(requests[0].messages[0].content, "You are helpful.");
    }
}
