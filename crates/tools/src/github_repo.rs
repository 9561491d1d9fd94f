//! GitHub repository lookup.

use async_trait::async_trait;
use genui_core::error::ToolError;
use genui_core::schema::{FieldType, ToolSchema};
use genui_core::tool::Tool;
use genui_core::ui::UiFragment;
use serde_json::{Value, json};

use crate::client::require_secret;

const API_VERSION: &str = "2022-11-28";

pub struct GithubRepoTool {
    client: reqwest::Client,
    token: Option<String>,
    base_url: String,
}

impl GithubRepoTool {
    pub fn new(
        client: reqwest::Client,
        token: Option<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client,
            token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

/// Pick the fields the UI shows out of the `/repos` payload.
fn summarize(owner: &str, repo: &str, data: &Value) -> Value {
    json!({
        "owner": owner,
        "repo": repo,
        "description": data["description"],
        "stars": data["stargazers_count"].as_u64().unwrap_or(0),
        "language": data["language"],
    })
}

#[async_trait]
impl Tool for GithubRepoTool {
    fn name(&self) -> &str {
        "github_repo"
    }

    fn description(&self) -> &str {
        "A tool to fetch details of a Github repository. Given owner and repo names, this tool will return the repo description, stars, and primary language."
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::object()
            .required("owner", FieldType::String, "The name of the repository owner.")
            .required("repo", FieldType::String, "The name of the repository.")
    }

    async fn execute(&self, parameters: Value) -> Result<Value, ToolError> {
        let token = require_secret(&self.token, "GITHUB_TOKEN")?;
        let owner = parameters["owner"].as_str().unwrap_or_default();
        let repo = parameters["repo"].as_str().unwrap_or_default();

        let response = self
            .client
            .get(format!("{}/repos/{owner}/{repo}", self.base_url))
            .bearer_auth(token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
            .send()
            .await
            .map_err(|e| ToolError::Http {
                service: "github".into(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(owner, repo, status = status.as_u16(), "Repository lookup failed");
            return Err(ToolError::ExecutionFailed {
                tool_name: self.name().into(),
                reason: "There was an error fetching the repository. Please check the owner and repo names."
                    .into(),
            });
        }

        let data: Value = response.json().await.map_err(|e| ToolError::Http {
            service: "github".into(),
            reason: format!("invalid JSON body: {e}"),
        })?;

        Ok(summarize(owner, repo, &data))
    }

    fn loading_fragment(&self, _parameters: &Value) -> UiFragment {
        UiFragment::new("GithubLoading", json!({}))
    }

    fn result_fragment(&self, value: &Value) -> UiFragment {
        UiFragment::new("Github", value.clone())
    }
}
