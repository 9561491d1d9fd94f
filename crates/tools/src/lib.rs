//! Built-in tool implementations for genui.
//!
//! Tools give the agent the ability to interact with the world:
//! look up GitHub repositories, check the weather, read web page metadata,
//! generate images, and fetch order invoices.
//!
//! Network-backed tools share one HTTP client (see [`client::shared`]).

pub mod client;
pub mod dalle;
pub mod github_repo;
pub mod invoice;
pub mod weather;
pub mod web_data;

use std::sync::Arc;

use genui_config::AppConfig;
use genui_core::error::RegistryError;
use genui_core::tool::ToolRegistry;

pub use dalle::DalleTool;
pub use github_repo::GithubRepoTool;
pub use invoice::InvoiceTool;
pub use weather::WeatherTool;
pub use web_data::WebDataTool;

/// Create the tool registry with all built-in tools.
///
/// Secrets are not required here: a tool whose secret is missing stays
/// registered and fails when executed.
pub fn default_registry(config: &AppConfig) -> Result<ToolRegistry, RegistryError> {
    let tools = &config.tools;
    let client = client::shared().clone();

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GithubRepoTool::new(
        client.clone(),
        tools.github_token.clone(),
        &tools.github_api_url,
    )))?;
    registry.register(Arc::new(WeatherTool::new(
        client.clone(),
        tools.geocode_api_key.clone(),
        &tools.geocode_api_url,
        &tools.weather_api_url,
    )))?;
    registry.register(Arc::new(WebDataTool::new(
        client.clone(),
        tools.firecrawl_api_key.clone(),
        &tools.firecrawl_api_url,
    )))?;
    registry.register(Arc::new(DalleTool::new(
        client,
        config.image_api_key().map(String::from),
        &tools.images_api_url,
    )))?;
    registry.register(Arc::new(InvoiceTool))?;

    for name in registry.names() {
        tracing::debug!(tool = name, "Registered tool");
    }
    Ok(registry)
}
