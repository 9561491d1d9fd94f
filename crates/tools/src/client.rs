//! Process-wide HTTP client shared by every network-backed tool.

use std::sync::OnceLock;
use std::time::Duration;

use genui_core::error::ToolError;

const USER_AGENT: &str = concat!("genui/", env!("CARGO_PKG_VERSION"));

static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();

/// The shared client, created on first use.
///
/// Tools keep a clone, which shares the same connection pool.
pub fn shared() -> &'static reqwest::Client {
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            // api.weather.gov rejects requests without a user agent
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!(error = %e, "Falling back to default HTTP client");
                reqwest::Client::new()
            })
    })
}

/// Send `request` and decode a JSON body, mapping every failure to
/// [`ToolError::Http`] tagged with `service`.
pub(crate) async fn send_json(
    service: &str,
    request: reqwest::RequestBuilder,
) -> Result<serde_json::Value, ToolError> {
    let http_err = |reason: String| ToolError::Http {
        service: service.to_string(),
        reason,
    };

    let response = request.send().await.map_err(|e| http_err(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(service, status = status.as_u16(), body = %body, "Upstream returned error");
        return Err(http_err(format!("status {}", status.as_u16())));
    }

    response
        .json()
        .await
        .map_err(|e| http_err(format!("invalid JSON body: {e}")))
}

/// Require a configured secret, naming the environment variable it comes from.
pub(crate) fn require_secret<'a>(
    secret: &'a Option<String>,
    env_name: &str,
) -> Result<&'a str, ToolError> {
    secret
        .as_deref()
        .ok_or_else(|| ToolError::MissingSecret(env_name.to_string()))
}
