//! Web page metadata via the Firecrawl scrape API.

use async_trait::async_trait;
use genui_core::error::{FieldError, ToolError};
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::Tool;
use genui_core::ui::UiFragment;
use serde_json::{Value, json};

use crate::client::{require_secret, send_json};

pub struct WebDataTool {
    client: reqwest::Client,
    api_key: Option<String>,
    base_url: String,
}

impl WebDataTool {
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

fn check_url(raw: &str) -> Result<reqwest::Url, ToolError> {
    let invalid = || ToolError::InvalidParameters {
        tool: "get_web_data".into(),
        errors: vec![FieldError::new("url", "must be an absolute http(s) URL")],
    };
    let url = reqwest::Url::parse(raw).map_err(|_| invalid())?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        _ => Err(invalid()),
    }
}

#[async_trait]
impl Tool for WebDataTool {
    fn name(&self) -> &str {
        "get_web_data"
    }

    fn description(&self) -> &str {
        "A tool to fetch the current website data, given a url."
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::object().required("url", FieldType::String, "The url to scrape")
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        let key = require_secret(&self.api_key, "FIRECRAWL_API_KEY")?;
        let url = check_url(parameters["url"].as_str().unwrap_or_default())?;

        let body = send_json(
            "firecrawl",
            self.client
                .post(format!("{}/v0/scrape", self.base_url))
                .bearer_auth(key)
                .json(&json!({
                    "url": url.as_str(),
                    "pageOptions": { "screenshot": true },
                })),
        )
        .await?;

        let data = &body["data"];
        let metadata = &data["metadata"];
        let screenshot = if metadata["screenshot"].is_null() {
            data["screenshot"].clone()
        } else {
            metadata["screenshot"].clone()
        };

        Ok(json!({
            "url": url.as_str(),
            "title": metadata["title"],
            "description": metadata["description"],
            "screenshot": screenshot,
        }))
    }

    fn loading_fragment(&self, _parameters: &Value) -> UiFragment {
        UiFragment::new("CurrentWebLoading", json!({}))
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        UiFragment::new("CurrentWeb", value.clone())
    }
}
