//! Configuration loading, validation, and management for genui.
//!
//! Loads configuration from `~/.genui/config.toml` with environment
//! variable overrides. Validates all settings at startup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The root configuration structure.
///
/// Maps directly to `~/.genui/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Language model settings
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Agent loop limits and timeouts
    #[serde(default)]
    pub agent: AgentConfig,

    /// Secrets and endpoints of the built-in tools
    #[serde(default)]
    pub tools: ToolsConfig,

    /// HTTP gateway configuration
    #[serde(default)]
    pub gateway: GatewayConfig,
}

/// Redact a secret for Debug output.
fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible chat completions API
    #[serde(default = "default_api_url")]
    pub api_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Prepended to every conversation sent to the model
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
}

fn default_api_url() -> String {
    "https://api.openai.com/v1".into()
}
fn default_model() -> String {
    "gpt-4o".into()
}
fn default_temperature() -> f32 {
    0.0
}
fn default_system_prompt() -> String {
    "You are a helpful assistant. You're provided a list of tools, and an input from the user.\n\
     Your job is to determine whether or not you have a tool which can handle the user's input, \
     or respond with plain text."
        .into()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: default_api_url(),
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: None,
            system_prompt: default_system_prompt(),
        }
    }
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &redact(&self.api_key))
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("system_prompt", &self.system_prompt)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Upper bound on tool round trips per request
    #[serde(default = "default_max_round_trips")]
    pub max_round_trips: u32,

    #[serde(default = "default_model_timeout_secs")]
    pub model_timeout_secs: u64,

    /// Applies to tools that do not declare their own timeout
    #[serde(default = "default_tool_timeout_secs")]
    pub tool_timeout_secs: u64,
}

fn default_max_round_trips() -> u32 {
    8
}
fn default_model_timeout_secs() -> u64 {
    60
}
fn default_tool_timeout_secs() -> u64 {
    30
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_round_trips: default_max_round_trips(),
            model_timeout_secs: default_model_timeout_secs(),
            tool_timeout_secs: default_tool_timeout_secs(),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geocode_api_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub firecrawl_api_key: Option<String>,

    /// Key for image generation; falls back to the provider key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai_api_key: Option<String>,

    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,

    #[serde(default = "default_geocode_api_url")]
    pub geocode_api_url: String,

    #[serde(default = "default_weather_api_url")]
    pub weather_api_url: String,

    #[serde(default = "default_firecrawl_api_url")]
    pub firecrawl_api_url: String,

    #[serde(default = "default_images_api_url")]
    pub images_api_url: String,
}

fn default_github_api_url() -> String {
    "https://api.github.com".into()
}
fn default_geocode_api_url() -> String {
    "https://geocode.xyz".into()
}
fn default_weather_api_url() -> String {
    "https://api.weather.gov".into()
}
fn default_firecrawl_api_url() -> String {
    "https://api.firecrawl.dev".into()
}
fn default_images_api_url() -> String {
    "https://api.openai.com/v1".into()
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            github_token: None,
            geocode_api_key: None,
            firecrawl_api_key: None,
            openai_api_key: None,
            github_api_url: default_github_api_url(),
            geocode_api_url: default_geocode_api_url(),
            weather_api_url: default_weather_api_url(),
            firecrawl_api_url: default_firecrawl_api_url(),
            images_api_url: default_images_api_url(),
        }
    }
}

impl std::fmt::Debug for ToolsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolsConfig")
            .field("github_token", &redact(&self.github_token))
            .field("geocode_api_key", &redact(&self.geocode_api_key))
            .field("firecrawl_api_key", &redact(&self.firecrawl_api_key))
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("github_api_url", &self.github_api_url)
            .field("geocode_api_url", &self.geocode_api_url)
            .field("weather_api_url", &self.weather_api_url)
            .field("firecrawl_api_url", &self.firecrawl_api_url)
            .field("images_api_url", &self.images_api_url)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_host")]
    pub host: String,

    /// CORS origins. Empty = any origin.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_port() -> u16 {
    3000
}
fn default_host() -> String {
    "127.0.0.1".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
            allowed_origins: vec![],
        }
    }
}

impl AppConfig {
    /// Load configuration from the default path (~/.genui/config.toml),
    /// then apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::config_dir().join("config.toml");
        let mut config = Self::load_from(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::info!("No config file found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides through `lookup`.
    ///
    /// Keys:
    /// - `GENUI_API_KEY`, then `OPENAI_API_KEY` (only if no key is configured)
    /// - `GENUI_MODEL`, `GENUI_API_URL` (always win over the file)
    /// - `GITHUB_TOKEN`, `GEOCODE_API_KEY`, `FIRECRAWL_API_KEY`
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if self.provider.api_key.is_none() {
            self.provider.api_key =
                non_empty("GENUI_API_KEY").or_else(|| non_empty("OPENAI_API_KEY"));
        }
        if self.tools.openai_api_key.is_none() {
            self.tools.openai_api_key = non_empty("OPENAI_API_KEY");
        }
        if let Some(model) = non_empty("GENUI_MODEL") {
            self.provider.model = model;
        }
        if let Some(url) = non_empty("GENUI_API_URL") {
            self.provider.api_url = url;
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.tools.github_token = Some(token);
        }
        if let Some(key) = non_empty("GEOCODE_API_KEY") {
            self.tools.geocode_api_key = Some(key);
        }
        if let Some(key) = non_empty("FIRECRAWL_API_KEY") {
            self.tools.firecrawl_api_key = Some(key);
        }
    }

    /// Get the configuration directory path.
    pub fn config_dir() -> PathBuf {
        dirs_home().join(".genui")
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=2.0).contains(&self.provider.temperature) {
            return Err(ConfigError::ValidationError(
                "provider.temperature must be between 0.0 and 2.0".into(),
            ));
        }

        if self.provider.model.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.model must not be empty".into(),
            ));
        }

        if self.agent.max_round_trips == 0 {
            return Err(ConfigError::ValidationError(
                "agent.max_round_trips must be at least 1".into(),
            ));
        }

        if self.agent.model_timeout_secs == 0 || self.agent.tool_timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "agent timeouts must be greater than 0".into(),
            ));
        }

        Ok(())
    }

    /// Check if a model API key is available (from config or environment).
    pub fn has_api_key(&self) -> bool {
        self.provider.api_key.is_some()
    }

    /// Key used for image generation.
    pub fn image_api_key(&self) -> Option<&str> {
        self.tools
            .openai_api_key
            .as_deref()
            .or(self.provider.api_key.as_deref())
    }

    /// A copy with every secret replaced by a marker, safe to print.
    pub fn redacted(&self) -> Self {
        let mask = |s: &Option<String>| s.as_ref().map(|_| "[REDACTED]".to_string());
        let mut out = self.clone();
        out.provider.api_key = mask(&self.provider.api_key);
        out.tools.github_token = mask(&self.tools.github_token);
        out.tools.geocode_api_key = mask(&self.tools.geocode_api_key);
        out.tools.firecrawl_api_key = mask(&self.tools.firecrawl_api_key);
        out.tools.openai_api_key = mask(&self.tools.openai_api_key);
        out
    }

    /// Generate a default config TOML string.
    pub fn default_toml() -> String {
        let config = Self::default();
        toml::to_string_pretty(&config).unwrap_or_default()
    }
}

/// Get the user's home directory.
fn dirs_home() -> PathBuf {
    #[cfg(target_os = "windows")]
    {
        std::env::var("USERPROFILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("C:\\Users\\Default"))
    }
    #[cfg(not(target_os = "windows"))]
    {
        std::env::var("HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("/tmp"))
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {path}: {reason}")]
    ReadError { path: PathBuf, reason: String },

    #[error("Failed to parse config file at {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn redacted_hides_every_secret() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-live".into());
        config.tools.github_token = Some("ghp_x".into());
        config.tools.firecrawl_api_key = Some("fc-x".into());

        let shown = toml::to_string_pretty(&config.redacted()).unwrap();
        assert!(!shown.contains("sk-live"));
        assert!(!shown.contains("ghp_x"));
        assert!(!shown.contains("fc-x"));
        assert!(shown.contains("[REDACTED]"));
        // Unset secrets stay unset.
        assert!(config.redacted().tools.geocode_api_key.is_none());
    }

    #[test]
    fn default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.agent.max_round_trips, 8);
        assert_eq!(config.agent.model_timeout_secs, 60);
        assert_eq!(config.agent.tool_timeout_secs, 30);
        assert_eq!(config.gateway.port, 3000);
        assert_eq!(config.provider.model, "gpt-4o");
    }

    #[test]
    fn config_roundtrip_toml() {
        let config = AppConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.provider.model, config.provider.model);
        assert_eq!(parsed.tools.weather_api_url, config.tools.weather_api_url);
    }

    #[test]
    fn invalid_temperature_rejected() {
        let mut config = AppConfig::default();
        config.provider.temperature = 5.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_round_trips_rejected() {
        let mut config = AppConfig::default();
        config.agent.max_round_trips = 0;
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("max_round_trips"));
    }

    #[test]
    fn missing_config_file_returns_defaults() {
        let config = AppConfig::load_from(Path::new("/nonexistent/config.toml")).unwrap();
        assert_eq!(config.provider.api_url, "https://api.openai.com/v1");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[provider]
model = "gpt-4o-mini"

[agent]
max_round_trips = 3
"#
        )
        .unwrap();

        let config = AppConfig::load_from(file.path()).unwrap();
        assert_eq!(config.provider.model, "gpt-4o-mini");
        assert_eq!(config.agent.max_round_trips, 3);
        assert_eq!(config.agent.tool_timeout_secs, 30);
        assert_eq!(config.tools.github_api_url, "https://api.github.com");
    }

    #[test]
    fn malformed_file_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent\nmax_round_trips = ").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn invalid_file_is_validation_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[agent]\ntool_timeout_secs = 0").unwrap();
        let err = AppConfig::load_from(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("OPENAI_API_KEY", "sk-openai"),
            ("GENUI_MODEL", "gpt-4.1"),
            ("GITHUB_TOKEN", "ghp_x"),
            ("GEOCODE_API_KEY", "geo"),
            ("FIRECRAWL_API_KEY", "fc"),
        ]));
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-openai"));
        assert_eq!(config.provider.model, "gpt-4.1");
        assert_eq!(config.tools.github_token.as_deref(), Some("ghp_x"));
        assert_eq!(config.tools.geocode_api_key.as_deref(), Some("geo"));
        assert_eq!(config.tools.firecrawl_api_key.as_deref(), Some("fc"));
        assert_eq!(config.image_api_key(), Some("sk-openai"));
    }

    #[test]
    fn genui_key_beats_openai_key() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[
            ("GENUI_API_KEY", "sk-genui"),
            ("OPENAI_API_KEY", "sk-openai"),
        ]));
        assert_eq!(config.provider.api_key.as_deref(), Some("sk-genui"));
    }

    #[test]
    fn configured_key_is_not_overridden() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("from-file".into());
        config.apply_env_overrides(env(&[("OPENAI_API_KEY", "sk-openai")]));
        assert_eq!(config.provider.api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn blank_env_values_ignored() {
        let mut config = AppConfig::default();
        config.apply_env_overrides(env(&[("GENUI_MODEL", "  "), ("GITHUB_TOKEN", "")]));
        assert_eq!(config.provider.model, "gpt-4o");
        assert!(config.tools.github_token.is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let mut config = AppConfig::default();
        config.provider.api_key = Some("sk-secret-value".into());
        config.tools.github_token = Some("ghp_secret".into());
        let debug = format!("{config:?}");
        assert!(!debug.contains("sk-secret-value"));
        assert!(!debug.contains("ghp_secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn default_toml_generation() {
        let toml_str = AppConfig::default_toml();
        assert!(toml_str.contains("[agent]"));
        assert!(toml_str.contains("max_round_trips = 8"));
        assert!(!toml_str.contains("api_key"));
    }
}
