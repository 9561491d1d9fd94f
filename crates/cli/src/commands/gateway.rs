//! `genui gateway`: Start the HTTP API server.

use genui_config::AppConfig;

pub async fn run(port_override: Option<u16>) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    if let Some(port) = port_override {
        config.gateway.port = port;
    }

    println!("genui gateway");
    println!("   Listening: {}:{}", config.gateway.host, config.gateway.port);
    println!("   Model:     {}", config.provider.model);
    println!("   Stream:    POST /v1/agent (server-sent events)");

    genui_gateway::start(config).await?;

    Ok(())
}
