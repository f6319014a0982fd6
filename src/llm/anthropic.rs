use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ApiEndpoint, ChatMessage, LlmClient, ModelCatalog, TEMPERATURE, apply_limit, checked_request,
    error_detail, generation_failed, user_message,
};
use crate::cli::Provider;

pub const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const MODEL_PAGE_SIZE: usize = 50;

pub fn fallback_models() -> ModelCatalog {
    ModelCatalog::from_pairs([
        ("Claude Sonnet 4", "claude-sonnet-4-20250514"),
        ("Claude Opus 4.1", "claude-opus-4-1-20250805"),
        ("Claude Sonnet 3.7", "claude-3-7-sonnet-20250219"),
        ("Claude Sonnet 3.5 (New)", "claude-3-5-sonnet-20241022"),
        ("Claude Haiku 3.5", "claude-3-5-haiku-20241022"),
        ("Claude Sonnet 3.5 (Old)", "claude-3-5-sonnet-20240620"),
    ])
}

#[derive(Debug, Deserialize)]
struct ModelsPage {
    #[serde(default)]
    data: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
struct ModelInfo {
    id: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

fn created_at_millis(value: Option<&str>) -> i64 {
    value
        .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
        .map(|ts| ts.timestamp_millis())
        .unwrap_or(i64::MIN)
}

async fn fetch_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> Result<ModelCatalog> {
    let response = endpoint
        .http
        .get(endpoint.url("v1/models"))
        .query(&[("limit", MODEL_PAGE_SIZE)])
        .header("x-api-key", &endpoint.api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
        .send()
        .await
        .context("failed to reach the Anthropic models endpoint")?;
    if !response.status().is_success() {
        anyhow::bail!("model listing failed: {}", error_detail(response).await);
    }
    let mut page: ModelsPage = response
        .json()
        .await
        .context("failed to decode Anthropic model list")?;

    page.data.sort_by_key(|model| {
        std::cmp::Reverse(created_at_millis(model.created_at.as_deref()))
    });
    let catalog = ModelCatalog::from_pairs(page.data.into_iter().map(|model| {
        let name = model.display_name.unwrap_or_else(|| model.id.clone());
        (name, model.id)
    }));
    Ok(apply_limit(catalog, limit))
}

/// Newest models first. Any listing failure falls back to the built-in catalog.
pub async fn list_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> ModelCatalog {
    match fetch_models(endpoint, limit).await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => apply_limit(fallback_models(), limit),
        Err(err) => {
            tracing::warn!(provider = "claude", error = %err, "using built-in model list");
            apply_limit(fallback_models(), limit)
        }
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClaudeClient {
    endpoint: ApiEndpoint,
    model_id: String,
    model_name: String,
}

impl ClaudeClient {
    pub fn new(endpoint: ApiEndpoint, model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_id: model_id.into(),
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl LlmClient for ClaudeClient {
    fn provider(&self) -> Provider {
        Provider::Claude
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let max_tokens = checked_request(Provider::Claude, &self.model_id, max_tokens)?;
        let body = MessagesRequest {
            model: &self.model_id,
            max_tokens,
            temperature: TEMPERATURE,
            messages: user_message(prompt),
        };

        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("v1/messages"))
            .header("x-api-key", &self.endpoint.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|err| generation_failed(Provider::Claude, err))?;
        if !response.status().is_success() {
            return Err(generation_failed(Provider::Claude, error_detail(response).await));
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|err| generation_failed(Provider::Claude, err))?;
        let text = parsed
            .content
            .into_iter()
            .find_map(|block| block.text)
            .ok_or_else(|| generation_failed(Provider::Claude, "response contained no text"))?;
        Ok(text.trim().to_string())
    }

    async fn list_available_models(&self, limit: Option<usize>) -> Result<ModelCatalog> {
        Ok(list_models(&self.endpoint, limit).await)
    }
}
