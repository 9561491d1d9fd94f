//! Shared test helpers: scripted providers and stub tools.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use genui_core::error::{ProviderError, ToolError};
use genui_core::message::{Message, MessageToolCall};
use genui_core::provider::{Provider, ProviderRequest, ProviderResponse, Usage};
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::{Tool, ToolRegistry};
use genui_core::ui::UiFragment;
use serde_json::{Value, json};

/// A mock provider that returns a sequence of scripted results.
///
/// Each call to `complete` pops the next result and records the request.
/// Once the script is exhausted every call fails with `NotConfigured`.
pub struct ScriptedProvider {
    script: Mutex<VecDeque<Result<ProviderResponse, ProviderError>>>,
    requests: Mutex<Vec<ProviderRequest>>,
    delay: Option<Duration>,
}

impl ScriptedProvider {
    pub fn new(responses: Vec<ProviderResponse>) -> Self {
        Self::from_results(responses.into_iter().map(Ok).collect())
    }

    pub fn from_results(results: Vec<Result<ProviderResponse, ProviderError>>) -> Self {
        Self {
            script: Mutex::new(results.into()),
            requests: Mutex::new(Vec::new()),
            delay: None,
        }
    }

    /// A provider that asks for the same tool call forever.
    pub fn always_tool(name: &str, args: Value, times: usize) -> Self {
        Self::new(
            (0..times)
                .map(|_| make_tool_call_response(vec![make_tool_call(name, args.clone())]))
                .collect(),
        )
    }

    /// Sleep before answering each call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        self.requests.lock().unwrap().push(request);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.script.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Err(ProviderError::NotConfigured("script exhausted".into())))
    }
}

/// Create a simple text response (no tool calls).
pub fn make_text_response(text: &str) -> ProviderResponse {
    ProviderResponse {
        message: Message::assistant(text),
        usage: Some(Usage {
            prompt_tokens: 10,
            completion_tokens: 5,
            total_tokens: 15,
        }),
        model: "mock-model".into(),
    }
}

/// Create a response that requests tool calls.
pub fn make_tool_call_response(tool_calls: Vec<MessageToolCall>) -> ProviderResponse {
    let mut msg = Message::assistant("");
    msg.tool_calls = tool_calls;
    ProviderResponse {
        message: msg,
        usage: None,
        model: "mock-model".into(),
    }
}

/// Helper to create a tool call.
pub fn make_tool_call(name: &str, args: Value) -> MessageToolCall {
    MessageToolCall {
        id: format!("call_{name}"),
        name: name.to_string(),
        arguments: serde_json::to_string(&args).unwrap(),
    }
}

pub fn registry(tools: Vec<Arc<dyn Tool>>) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    for tool in tools {
        registry.register(tool).unwrap();
    }
    registry
}

enum Behavior {
    Return(Value),
    Fail(String),
    Sleep(Duration),
    Panic(&'static str),
}

/// Configurable tool that records how it was called.
pub struct StubTool {
    name: String,
    schema: ToolSchema,
    behavior: Behavior,
    timeout: Option<Duration>,
    calls: AtomicUsize,
    last_params: Mutex<Option<Value>>,
    components: Option<(&'static str, &'static str)>,
}

impl StubTool {
    fn new(name: &str, schema: ToolSchema, behavior: Behavior) -> Self {
        Self {
            name: name.into(),
            schema,
            behavior,
            timeout: None,
            calls: AtomicUsize::new(0),
            last_params: Mutex::new(None),
            components: None,
        }
    }

    /// `get_weather` with the real schema, always 85 degrees.
    pub fn weather() -> Self {
        let schema = ToolSchema::object()
            .required("city", FieldType::String, "City")
            .required("state", FieldType::String, "State")
            .optional("country", FieldType::String, "Country")
            .with_default(json!("usa"));
        let mut tool = Self::new(
            "get_weather",
            schema,
            Behavior::Return(json!({"temperature": 85})),
        );
        tool.components = Some(("CurrentWeatherLoading", "CurrentWeather"));
        tool
    }

    pub fn returning(name: &str, value: Value) -> Self {
        Self::new(name, ToolSchema::object(), Behavior::Return(value))
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self::new(name, ToolSchema::object(), Behavior::Fail(reason.into()))
    }

    pub fn sleeping(name: &str, duration: Duration) -> Self {
        Self::new(name, ToolSchema::object(), Behavior::Sleep(duration))
    }

    pub fn panicking(name: &str, message: &'static str) -> Self {
        Self::new(name, ToolSchema::object(), Behavior::Panic(message))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_params(&self) -> Option<Value> {
        self.last_params.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Tool for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "stub tool for tests"
    }

    fn input_schema(&self) -> ToolSchema {
        self.schema.clone()
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_params.lock().unwrap() = Some(parameters.clone());
        match &self.behavior {
            // Echo the parameters merged with the canned value.
            Behavior::Return(value) => match (parameters, value) {
                (Value::Object(mut out), Value::Object(extra)) => {
                    out.extend(extra.clone());
                    Ok(Value::Object(out))
                }
                (_, value) => Ok(value.clone()),
            },
            Behavior::Fail(reason) => Err(ToolError::ExecutionFailed {
                tool_name: self.name.clone(),
                reason: reason.clone(),
            }),
            Behavior::Sleep(duration) => {
                tokio::time::sleep(*duration).await;
                Ok(json!({"slept_secs": duration.as_secs()}))
            }
            Behavior::Panic(message) => panic!("{message}"),
        }
    }

    fn loading_fragment(&self, _parameters: &Value) -> UiFragment {
        match self.components {
            Some((loading, _)) => UiFragment::new(loading, json!({})),
            None => UiFragment::loading(&self.name),
        }
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        match self.components {
            Some((_, result)) => UiFragment::new(result, value.clone()),
            None => UiFragment::new("ToolResult", value.clone()),
        }
    }
}
