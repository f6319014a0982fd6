use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ApiEndpoint, ChatMessage, LlmClient, ModelCatalog, TEMPERATURE, apply_limit, checked_request,
    error_detail, generation_failed, user_message,
};
use crate::cli::Provider;

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com";

const CHAT_FAMILIES: &[&str] = &["gpt-4", "gpt-3.5", "o1", "o3", "chatgpt"];
const NON_CHAT_MARKERS: &[&str] = &[
    "deep-research",
    "audio",
    "realtime",
    "image",
    "tts",
    "transcribe",
    "search",
];

pub fn fallback_models() -> ModelCatalog {
    ModelCatalog::from_pairs([
        ("O3 Mini", "o3-mini"),
        ("GPT-4o", "gpt-4o"),
        ("GPT-4o Mini", "gpt-4o-mini"),
        ("O1", "o1"),
        ("GPT-4 Turbo", "gpt-4-turbo"),
        ("GPT-3.5 Turbo", "gpt-3.5-turbo"),
    ])
}

pub fn is_chat_model(model_id: &str) -> bool {
    CHAT_FAMILIES.iter().any(|family| model_id.contains(family))
        && !NON_CHAT_MARKERS.iter().any(|marker| model_id.contains(marker))
}

/// Reasoning models take `max_completion_tokens` and reject sampling parameters.
pub fn is_reasoning_model(model_id: &str) -> bool {
    model_id.contains("o1") || model_id.contains("o3")
}

/// `gpt-4o-mini` becomes `Gpt 4O Mini`: dashes to spaces, then each cased run capitalized.
pub fn display_name_for(model_id: &str) -> String {
    let mut out = String::with_capacity(model_id.len());
    let mut previous_cased = false;
    for ch in model_id.replace('-', " ").chars() {
        if ch.is_alphabetic() {
            if previous_cased {
                out.extend(ch.to_lowercase());
            } else {
                out.extend(ch.to_uppercase());
            }
            previous_cased = true;
        } else {
            out.push(ch);
            previous_cased = false;
        }
    }
    out
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
    created: i64,
}

async fn fetch_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> Result<ModelCatalog> {
    let response = endpoint
        .http
        .get(endpoint.url("v1/models"))
        .bearer_auth(&endpoint.api_key)
        .send()
        .await
        .context("failed to reach the OpenAI models endpoint")?;
    if !response.status().is_success() {
        anyhow::bail!("model listing failed: {}", error_detail(response).await);
    }
    let page: ModelsPage = response
        .json()
        .await
        .context("failed to decode OpenAI model list")?;

    let mut models = page
        .data
        .into_iter()
        .filter(|model| is_chat_model(&model.id))
        .collect::<Vec<ModelInfo>>();
    models.sort_by_key(|model| std::cmp::Reverse(model.created));
    let catalog = ModelCatalog::from_pairs(
        models
            .into_iter()
            .map(|model| (display_name_for(&model.id), model.id)),
    );
    Ok(apply_limit(catalog, limit))
}

pub async fn list_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> ModelCatalog {
    match fetch_models(endpoint, limit).await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => apply_limit(fallback_models(), limit),
        Err(err) => {
            tracing::warn!(provider = "openai", error = %err, "using built-in model list");
            apply_limit(fallback_models(), limit)
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatCompletionRequest<'a> {
    pub model: &'a str,
    pub messages: Vec<ChatMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub presence_penalty: Option<f32>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Choice {
    pub message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChoiceMessage {
    #[serde(default)]
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    pub(crate) fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|text| text.trim().to_string())
    }
}

pub(crate) fn completion_request<'a>(
    model_id: &'a str,
    prompt: &'a str,
    max_tokens: u32,
) -> ChatCompletionRequest<'a> {
    if is_reasoning_model(model_id) {
        ChatCompletionRequest {
            model: model_id,
            messages: user_message(prompt),
            max_tokens: None,
            max_completion_tokens: Some(max_tokens),
            temperature: None,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    } else {
        ChatCompletionRequest {
            model: model_id,
            messages: user_message(prompt),
            max_tokens: Some(max_tokens),
            max_completion_tokens: None,
            temperature: Some(TEMPERATURE),
            top_p: Some(1.0),
            frequency_penalty: Some(0.0),
            presence_penalty: Some(0.0),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    endpoint: ApiEndpoint,
    model_id: String,
    model_name: String,
}

impl OpenAiClient {
    pub fn new(endpoint: ApiEndpoint, model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_id: model_id.into(),
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    fn provider(&self) -> Provider {
        Provider::Openai
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let max_tokens = checked_request(Provider::Openai, &self.model_id, max_tokens)?;
        let body = completion_request(&self.model_id, prompt, max_tokens);

        let response = self
            .endpoint
            .http
            .post(self.endpoint.url("v1/chat/completions"))
            .bearer_auth(&self.endpoint.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| generation_failed(Provider::Openai, err))?;
        if !response.status().is_success() {
            return Err(generation_failed(Provider::Openai, error_detail(response).await));
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| generation_failed(Provider::Openai, err))?;
        parsed
            .into_text()
            .ok_or_else(|| generation_failed(Provider::Openai, "response contained no text"))
    }

    async fn list_available_models(&self, limit: Option<usize>) -> Result<ModelCatalog> {
        Ok(list_models(&self.endpoint, limit).await)
    }
}
