//! HTTP API v1.
//!
//! Endpoints:
//!
//! - `GET  /v1/tools`      : List registered tools with their input schemas
//! - `POST /v1/agent`      : Run the agent, get an SSE stream of UI events
//! - `POST /v1/agent/sync` : Run the agent, get all events and the result at once

use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::{get, post},
};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use tracing::info;

use genui_agent::{AgentLoop, RunError, RunOutcome, UiEvent};
use genui_core::message::ConversationTurn;

// ── State ─────────────────────────────────────────────────────────────────

/// Shared state for the v1 API.
pub struct ApiState {
    pub agent: AgentLoop,
    pub start_time: chrono::DateTime<chrono::Utc>,
}

impl ApiState {
    pub fn new(agent: AgentLoop) -> Self {
        Self {
            agent,
            start_time: chrono::Utc::now(),
        }
    }
}

pub type SharedApiState = Arc<ApiState>;

// ── Router ────────────────────────────────────────────────────────────────

/// Build the v1 API router. Nest this under "/v1" in the main router.
pub fn v1_router(state: SharedApiState) -> Router {
    Router::new()
        .route("/tools", get(list_tools_handler))
        .route("/agent", post(agent_stream_handler))
        .route("/agent/sync", post(agent_sync_handler))
        .with_state(state)
}

// ── Request / Response types ──────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct AgentRequest {
    pub input: String,
    /// Prior turns, oldest first. The client owns the history.
    #[serde(default)]
    pub chat_history: Vec<ConversationTurn>,
}

/// Payload of the terminal SSE event, and the `result` of a sync run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DoneEvent {
    Ok { answer: String },
    Error { error: RunError },
}

impl From<RunOutcome> for DoneEvent {
    fn from(outcome: RunOutcome) -> Self {
        match outcome {
            Ok(answer) => Self::Ok { answer },
            Err(error) => Self::Error { error },
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SyncResponse {
    pub events: Vec<UiEvent>,
    pub result: DoneEvent,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolListResponse {
    pub tools: Vec<ToolDto>,
    pub count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ToolDto {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: &str) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

impl AgentRequest {
    fn check(&self) -> Result<(), ApiError> {
        if self.input.trim().is_empty() {
            return Err(bad_request("input must not be empty"));
        }
        Ok(())
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────

async fn list_tools_handler(State(state): State<SharedApiState>) -> Json<ToolListResponse> {
    let defs = state.agent.registry().definitions();
    let count = defs.len();

    Json(ToolListResponse {
        tools: defs
            .into_iter()
            .map(|d| ToolDto {
                name: d.name,
                description: d.description,
                parameters: d.parameters,
            })
            .collect(),
        count,
    })
}

/// `POST /v1/agent`: Run the agent and stream its UI events over SSE.
///
/// One SSE event per UI event (`loading`, `result`, `error`), followed by
/// exactly one `done` event. Dropping the connection cancels the run.
async fn agent_stream_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<AgentRequest>,
) -> Result<Sse<impl futures::Stream<Item = Result<SseEvent, Infallible>>>, ApiError> {
    payload.check()?;

    let run = state.agent.invoke(payload.input, payload.chat_history);
    info!(run_id = %run.run_id, "v1/agent SSE request");

    // Lives inside the response stream: a client that goes away drops it.
    let guard = run.cancel.clone().drop_guard();
    let result = run.result;

    let events = run.ui.map(|event| Ok::<_, Infallible>(ui_sse_event(&event)));
    let done = futures::stream::once(async move {
        let outcome = result.await;
        let _ = guard.disarm();
        Ok::<_, Infallible>(done_sse_event(outcome))
    });

    Ok(Sse::new(events.chain(done)).keep_alive(KeepAlive::default()))
}

/// `POST /v1/agent/sync`: Run the agent to completion and return everything.
async fn agent_sync_handler(
    State(state): State<SharedApiState>,
    Json(payload): Json<AgentRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    payload.check()?;

    let run = state.agent.invoke(payload.input, payload.chat_history);
    info!(run_id = %run.run_id, "v1/agent/sync request");

    let (events, outcome) = run.collect().await;
    Ok(Json(SyncResponse {
        events,
        result: outcome.into(),
    }))
}

fn ui_sse_event(event: &UiEvent) -> SseEvent {
    let data = serde_json::to_string(event).unwrap_or_default();
    SseEvent::default()
        .event(event.event_type())
        .id(event.id.clone())
        .data(data)
}

fn done_sse_event(outcome: RunOutcome) -> SseEvent {
    let data = serde_json::to_string(&DoneEvent::from(outcome)).unwrap_or_default();
    SseEvent::default().event("done").data(data)
}
