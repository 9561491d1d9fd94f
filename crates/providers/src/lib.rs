//! LLM provider implementations for genui.
//!
//! All providers implement the `genui_core::Provider` trait. The agent only
//! ever sees an `Arc<dyn Provider>`, so tests can substitute scripted ones.

pub mod openai_compat;

use std::sync::Arc;

use genui_core::{Provider, ProviderError};

pub use openai_compat::OpenAiCompatProvider;

/// Build the configured model provider.
///
/// Fails with [`ProviderError::NotConfigured`] when no API key is available,
/// so a misconfigured process is reported at startup rather than on the
/// first request.
pub fn build_from_config(
    config: &genui_config::AppConfig,
) -> Result<Arc<dyn Provider>, ProviderError> {
    let api_key = config.provider.api_key.clone().ok_or_else(|| {
        ProviderError::NotConfigured(
            "no API key: set provider.api_key, GENUI_API_KEY or OPENAI_API_KEY".into(),
        )
    })?;

    let name = if config.provider.api_url.contains("api.openai.com") {
        "openai"
    } else {
        "openai-compatible"
    };

    tracing::debug!(provider = name, url = %config.provider.api_url, "Building model provider");

    Ok(Arc::new(OpenAiCompatProvider::new(
        name,
        &config.provider.api_url,
        api_key,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_key_is_not_configured() {
        let config = genui_config::AppConfig::default();
        let err = build_from_config(&config).err().unwrap();
        assert!(matches!(err, ProviderError::NotConfigured(_)));
    }

    #[test]
    fn builds_openai_provider() {
        let mut config = genui_config::AppConfig::default();
        config.provider.api_key = Some("sk-test".into());
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai");
    }

    #[test]
    fn custom_url_is_generic_provider() {
        let mut config = genui_config::AppConfig::default();
        config.provider.api_key = Some("ollama".into());
        config.provider.api_url = "http://localhost:11434/v1".into();
        let provider = build_from_config(&config).unwrap();
        assert_eq!(provider.name(), "openai-compatible");
    }
}
