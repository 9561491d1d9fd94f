//! HTTP gateway for genui.
//!
//! Exposes a health check and the v1 API, which runs the agent loop per
//! request and streams its UI events to the client as server-sent events.
//!
//! Built on Axum.

pub mod api_v1;

use std::sync::Arc;
use std::time::Duration;

use axum::extract::DefaultBodyLimit;
use axum::http::{HeaderValue, Method, header};
use axum::{Router, extract::State, response::Json, routing::get};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

use genui_agent::AgentLoop;
use genui_core::error::{ProviderError, RegistryError};

pub use api_v1::{ApiState, SharedApiState};

/// Request bodies above this size are rejected.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Startup and serving failures.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Provider setup failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool registry setup failed: {0}")]
    Registry(#[from] RegistryError),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Build the full router: `/health` plus the v1 API under `/v1`.
///
/// Layers applied:
/// - CORS restricted to `allowed_origins` (any origin when empty)
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedApiState, allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .with_state(state.clone())
        .nest("/v1", api_v1::v1_router(state))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(cors_layer(allowed_origins))
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(Duration::from_secs(3600));

    if allowed_origins.is_empty() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}

/// Start the gateway HTTP server.
///
/// Builds the provider and tool registry once and shares them across
/// requests through the agent loop.
pub async fn start(config: genui_config::AppConfig) -> Result<(), GatewayError> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    let provider = genui_providers::build_from_config(&config)?;
    let tools = Arc::new(genui_tools::default_registry(&config)?);
    let agent = AgentLoop::from_config(provider, tools, &config);
    let state = Arc::new(ApiState::new(agent));

    let app = build_router(state, &config.gateway.allowed_origins);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| GatewayError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!(addr = %addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(GatewayError::Serve)?;

    info!("Gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not install Ctrl-C handler");
        std::future::pending::<()>().await;
    }
}

// --- Handlers ---

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: i64,
    pub tools: usize,
}

async fn health_handler(State(state): State<SharedApiState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".into(),
        version: env!("CARGO_PKG_VERSION").into(),
        uptime_secs: (chrono::Utc::now() - state.start_time).num_seconds(),
        tools: state.agent.registry().len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use genui_core::tool::ToolRegistry;

    struct SilentProvider;

    #[async_trait::async_trait]
    impl genui_core::Provider for SilentProvider {
        fn name(&self) -> &str {
            "silent"
        }

        async fn complete(
            &self,
            _request: genui_core::ProviderRequest,
        ) -> Result<genui_core::ProviderResponse, ProviderError> {
            Err(ProviderError::NotConfigured("unused".into()))
        }
    }

    fn state() -> SharedApiState {
        let agent = AgentLoop::new(
            Arc::new(SilentProvider),
            Arc::new(ToolRegistry::new()),
            "mock-model",
        );
        Arc::new(ApiState::new(agent))
    }

    #[tokio::test]
    async fn health_endpoint() {
        let app = build_router(state(), &[]);

        let req = Request::builder()
            .uri("/health")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = response.into_body().collect().await.unwrap().to_bytes();
        let health: HealthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!(health.status, "ok");
        assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
        assert!(health.uptime_secs >= 0);
        assert_eq!(health.tools, 0);
    }

    #[tokio::test]
    async fn cors_allows_configured_origin() {
        let app = build_router(state(), &["http://localhost:3001".to_string()]);

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://localhost:3001")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "http://localhost:3001"
        );
    }

    #[tokio::test]
    async fn cors_rejects_other_origin() {
        let app = build_router(state(), &["http://localhost:3001".to_string()]);

        let req = Request::builder()
            .uri("/health")
            .header("origin", "http://evil.example")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert!(
            !response
                .headers()
                .contains_key("access-control-allow-origin")
        );
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() {
        let app = build_router(state(), &[]);

        let input = "x".repeat(MAX_BODY_BYTES + 1);
        let body = serde_json::json!({ "input": input }).to_string();
        let req = Request::builder()
            .method("POST")
            .uri("/v1/agent/sync")
            .header("content-type", "application/json")
            .body(Body::from(body))
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn unknown_route_is_404() {
        let app = build_router(state(), &[]);
        let req = Request::builder()
            .uri("/v1/nope")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
