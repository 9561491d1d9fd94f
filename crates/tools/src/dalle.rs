//! Image generation through the OpenAI images API.

use std::time::Duration;

use async_trait::async_trait;
use genui_core::error::ToolError;
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::Tool;
use genui_core::ui::UiFragment;
use serde_json::{Value, json};

use crate::client::{require_secret, send_json};

const MODEL: &str = "dall-e-3";

/// Image generation regularly takes longer than ordinary tool calls.
const TIMEOUT: Duration = Duration::from_secs(120);

pub struct DalleTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl DalleTool {
    pub fn new(
        client: reqwest::Client,
        api_key: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl Tool for DalleTool {
    fn name(&self) -> &str {
        "dalle_image"
    }

    fn description(&self) -> &str {
        "create image using OpenAI's Dall-E image generation tool."
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::object().required(
            "prompt",
            FieldType::String,
            "A text description for the image user wish to generate",
        )
    }

    fn timeout(&self) -> Option<Duration> {
        Some(TIMEOUT)
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        let key = require_secret(&self.api_key, "OPENAI_API_KEY")?;
        let prompt = parameters["prompt"].as_str().unwrap_or_default();

        let body = send_json(
            "openai images",
            self.client
                .post(format!("{}/images/generations", self.base_url))
                .bearer_auth(key)
                .json(&json!({ "model": MODEL, "prompt": prompt, "n": 1 })),
        )
        .await?;

        let url = body["data"][0]["url"].as_str().ok_or_else(|| ToolError::ExecutionFailed {
            tool_name: self.name().into(),
            reason: "no image URL in response".into(),
        })?;

        Ok(json!({ "imageURL": url }))
    }

    fn loading_fragment(&self, _parameters: &Value) -> UiFragment {
        UiFragment::new("DallELoading", json!({}))
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        UiFragment::new("DallE", value.clone())
    }
}
