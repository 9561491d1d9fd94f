//! `genui config`: Configuration management commands.

use genui_config::AppConfig;

pub async fn validate() -> Result<(), Box<dyn std::error::Error>> {
    println!("Validating configuration...");

    match AppConfig::load() {
        Ok(config) => {
            println!("   OK  Config parsed and validated");

            let warnings = warnings(&config);
            if warnings.is_empty() {
                println!("   OK  All checks passed");
            } else {
                println!();
                for w in &warnings {
                    println!("   WARN  {w}");
                }
            }

            println!();
            println!("   Model:       {}", config.provider.model);
            println!("   API URL:     {}", config.provider.api_url);
            println!("   Round trips: {}", config.agent.max_round_trips);
            println!(
                "   Gateway:     {}:{}",
                config.gateway.host, config.gateway.port
            );
        }
        Err(e) => {
            println!("   ERROR  {e}");
            return Err(e.into());
        }
    }

    Ok(())
}

/// Problems that do not stop the process but will fail some requests.
fn warnings(config: &AppConfig) -> Vec<&'static str> {
    let mut warnings = Vec::new();
    if !config.has_api_key() {
        warnings.push("No model API key set (set GENUI_API_KEY or OPENAI_API_KEY)");
    }
    if config.tools.github_token.is_none() {
        warnings.push("github_repo will fail: GITHUB_TOKEN is not set");
    }
    if config.tools.geocode_api_key.is_none() {
        warnings.push("get_weather will fail: GEOCODE_API_KEY is not set");
    }
    if config.tools.firecrawl_api_key.is_none() {
        warnings.push("get_web_data will fail: FIRECRAWL_API_KEY is not set");
    }
    if config.image_api_key().is_none() {
        warnings.push("dalle_image will fail: OPENAI_API_KEY is not set");
    }
    if config.gateway.host == "0.0.0.0" && config.gateway.allowed_origins.is_empty() {
        warnings.push("Gateway is publicly bound and accepts any CORS origin");
    }
    warnings
}

pub async fn show() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;
    let toml_str = toml::to_string_pretty(&config.redacted())?;
    println!("{toml_str}");
    Ok(())
}

pub async fn path() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = AppConfig::config_dir().join("config.toml");
    println!("{}", config_path.display());
    Ok(())
}
