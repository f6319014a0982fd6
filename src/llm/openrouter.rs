/// OpenRouter adapter: one OpenAI-compatible endpoint fronting many vendors.
///
/// Besides generation this module carries the catalog helpers the CLI and the
/// judge selection rely on: keyword search, best-match resolution of a search
/// term to a model id, account status warnings, and paid alternatives for
/// rate-limited free models.
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::openai::{ChatCompletionRequest, ChatCompletionResponse};
use super::{
    ApiEndpoint, LlmClient, ModelCatalog, TEMPERATURE, checked_request, error_detail, user_message,
};
use crate::cli::Provider;
use crate::error::PoetryError;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL_ID: &str = "openai/gpt-4o";
pub const REFERER: &str = "http://localhost:8080";
pub const APP_TITLE: &str = "Poetry Agents";

const MAX_ATTEMPTS: u32 = 3;
const DEFAULT_RETRY_BASE_DELAY: Duration = Duration::from_secs(5);
const SEARCH_RESULT_LIMIT: usize = 15;
const UNFILTERED_RESULT_LIMIT: usize = 20;

const FALLBACK_MODELS: &[(&str, &str)] = &[
    ("claude", "anthropic/claude-3.5-sonnet"),
    ("gpt", "openai/gpt-4o"),
    ("gpt-4", "openai/gpt-4o"),
    ("gemini", "google/gemini-pro"),
    ("llama", "meta-llama/llama-3.2-90b-vision-instruct"),
    ("baidu", "baidu/ernie-4.5-300b-a47b"),
    ("cohere", "cohere/command-r-plus"),
    ("mistral", "mistralai/mistral-large"),
    ("anthropic", "anthropic/claude-3.5-sonnet"),
];

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct OpenRouterModel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
}

impl OpenRouterModel {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.id)
    }

    pub fn is_free(&self) -> bool {
        self.id.contains(":free")
    }

    /// Models that only run with the caller's own upstream key.
    pub fn is_byok_only(&self) -> bool {
        let description = self.description.as_deref().unwrap_or_default().to_lowercase();
        description.contains("byok") || description.contains("bring your own")
    }
}

#[derive(Debug, Deserialize)]
struct ModelsPage {
    #[serde(default)]
    data: Vec<OpenRouterModel>,
}

pub async fn fetch_models(endpoint: &ApiEndpoint) -> Result<Vec<OpenRouterModel>> {
    let response = endpoint
        .http
        .get(endpoint.url("models"))
        .bearer_auth(&endpoint.api_key)
        .send()
        .await
        .context("failed to reach the OpenRouter models endpoint")?;
    if !response.status().is_success() {
        return Err(PoetryError::api(
            Provider::Openrouter.label(),
            format!("model listing failed: {}", error_detail(response).await),
        )
        .into());
    }
    let page: ModelsPage = response
        .json()
        .await
        .context("failed to decode OpenRouter model list")?;
    Ok(page.data)
}

// ---------------------------------------------------------------------------
// Catalog search
// ---------------------------------------------------------------------------

/// Ranks matches for the interactive picker: id prefix, then vendor segment,
/// then id substring, then name-only matches. Empty terms return the head of the list.
pub fn rank_search_results(models: Vec<OpenRouterModel>, term: &str) -> Vec<OpenRouterModel> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return models.into_iter().take(UNFILTERED_RESULT_LIMIT).collect();
    }

    let mut matches = models
        .into_iter()
        .filter(|model| {
            model.id.to_lowercase().contains(&needle)
                || model
                    .name
                    .as_deref()
                    .is_some_and(|name| name.to_lowercase().contains(&needle))
        })
        .collect::<Vec<OpenRouterModel>>();
    matches.sort_by_key(|model| {
        let id = model.id.to_lowercase();
        let vendor = id.split('/').next().unwrap_or_default();
        if id.starts_with(&needle) {
            0
        } else if vendor.contains(&needle) {
            1
        } else if id.contains(&needle) {
            2
        } else {
            3
        }
    });
    matches.truncate(SEARCH_RESULT_LIMIT);
    matches
}

pub async fn search_models(endpoint: &ApiEndpoint, term: &str) -> Result<Vec<OpenRouterModel>> {
    Ok(rank_search_results(fetch_models(endpoint).await?, term))
}

/// Resolves a search term such as "Claude" or "Baidu" to a concrete model id.
pub fn find_model_in(models: &[OpenRouterModel], term: &str) -> String {
    let needle = term.trim().to_lowercase();

    if let Some(model) = models
        .iter()
        .find(|model| model.id.to_lowercase().contains(&needle))
    {
        return model.id.clone();
    }

    if let Some(model) = models.iter().find(|model| {
        model
            .name
            .as_deref()
            .is_some_and(|name| name.to_lowercase().contains(&needle))
            || model
                .id
                .to_lowercase()
                .split('/')
                .any(|segment| segment.contains(&needle))
    }) {
        return model.id.clone();
    }

    if let Some((_, id)) = FALLBACK_MODELS
        .iter()
        .find(|(keyword, _)| needle.contains(keyword))
    {
        tracing::info!(term, model = *id, "no catalog match, using fallback model");
        return id.to_string();
    }

    tracing::warn!(term, model = DEFAULT_MODEL_ID, "no model matched search term, using default");
    DEFAULT_MODEL_ID.to_string()
}

pub async fn find_model(endpoint: &ApiEndpoint, term: &str) -> String {
    let models = match fetch_models(endpoint).await {
        Ok(models) => models,
        Err(err) => {
            tracing::warn!(error = %err, "could not fetch OpenRouter models for search");
            Vec::new()
        }
    };
    let model_id = find_model_in(&models, term);
    tracing::info!(term, model = %model_id, "resolved OpenRouter model");
    model_id
}

/// Name to id for every model usable without a bring-your-own key; `None` lists them all.
pub fn catalog_from(models: Vec<OpenRouterModel>, limit: Option<usize>) -> ModelCatalog {
    let mut catalog = ModelCatalog::from_pairs(
        models
            .iter()
            .filter(|model| !model.is_byok_only())
            .map(|model| (model.display_name().to_string(), model.id.clone())),
    );
    if let Some(limit) = limit.filter(|limit| *limit > 0) {
        catalog.truncate(limit);
    }
    catalog
}

pub async fn list_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> Result<ModelCatalog> {
    Ok(catalog_from(fetch_models(endpoint).await?, limit))
}

// ---------------------------------------------------------------------------
// Account and model status
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AccountStatus {
    pub usage: f64,
    pub limit: Option<f64>,
    pub is_free_tier: bool,
}

impl AccountStatus {
    pub fn credits_remaining(&self) -> Option<f64> {
        self.limit.map(|limit| limit - self.usage)
    }

    fn from_json(value: &Value) -> Self {
        let info = value.get("data").unwrap_or(value);
        Self {
            usage: info.get("usage").and_then(Value::as_f64).unwrap_or(0.0),
            limit: info.get("limit").and_then(Value::as_f64),
            is_free_tier: info
                .get("is_free_tier")
                .and_then(Value::as_bool)
                .unwrap_or(true),
        }
    }
}

pub fn account_warnings(model_id: &str, status: &AccountStatus) -> Vec<String> {
    let mut warnings = Vec::new();
    if model_id.contains(":free") {
        if status.is_free_tier {
            warnings.push("Using free model with free tier account - daily limit: 50 requests".to_string());
            warnings.push("Consider purchasing 10+ credits to unlock 1000 daily requests".to_string());
        } else {
            warnings.push("Using free model - daily limit: 1000 requests (20/minute)".to_string());
        }
        warnings.push("Free models may have upstream rate limits from providers".to_string());
    }
    if status.credits_remaining().is_some_and(|remaining| remaining < 1.0) {
        warnings.push("Low credits remaining - consider adding more credits".to_string());
    }
    warnings
}

pub async fn check_account_status(endpoint: &ApiEndpoint) -> Result<AccountStatus> {
    let response = endpoint
        .http
        .get(endpoint.url("auth/key"))
        .bearer_auth(&endpoint.api_key)
        .send()
        .await
        .context("failed to reach the OpenRouter key endpoint")?;
    if !response.status().is_success() {
        anyhow::bail!("account status check failed: {}", error_detail(response).await);
    }
    let body: Value = response
        .json()
        .await
        .context("failed to decode OpenRouter account status")?;
    Ok(AccountStatus::from_json(&body))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelStatus {
    pub available: bool,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_free_model: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pricing: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context_length: Option<u64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ModelStatus {
    fn unavailable(error: String) -> Self {
        Self {
            available: false,
            is_free_model: false,
            pricing: None,
            context_length: None,
            warnings: Vec::new(),
            error: Some(error),
        }
    }
}

pub fn model_status_from(models: &[OpenRouterModel], model_id: &str) -> ModelStatus {
    match models.iter().find(|model| model.id == model_id) {
        Some(model) => {
            let is_free = model.is_free();
            ModelStatus {
                available: true,
                is_free_model: is_free,
                pricing: Some(model.pricing.clone().unwrap_or_else(|| Value::Object(Default::default()))),
                context_length: Some(model.context_length.unwrap_or(0)),
                warnings: if is_free {
                    vec!["Free model - may have upstream rate limits".to_string()]
                } else {
                    Vec::new()
                },
                error: None,
            }
        }
        None => ModelStatus::unavailable(format!("Model {model_id} not found")),
    }
}

pub async fn check_model_status(endpoint: &ApiEndpoint, model_id: &str) -> ModelStatus {
    match fetch_models(endpoint).await {
        Ok(models) => model_status_from(&models, model_id),
        Err(err) => ModelStatus::unavailable(format!("Error checking model status: {err:#}")),
    }
}

/// Paid models worth suggesting when a free model keeps hitting upstream limits.
pub fn paid_alternatives(free_model_id: &str) -> Vec<&'static str> {
    let base = free_model_id.replace(":free", "");
    match base.as_str() {
        "meta-llama/llama-3.2-11b-vision-instruct" => vec![
            "meta-llama/llama-3.2-90b-vision-instruct",
            "meta-llama/llama-3.1-70b-instruct",
            "anthropic/claude-3.5-sonnet",
        ],
        "meta-llama/llama-3.2-3b-instruct" => vec![
            "meta-llama/llama-3.2-90b-vision-instruct",
            "meta-llama/llama-3.1-70b-instruct",
        ],
        "meta-llama/llama-3.1-8b-instruct" => vec![
            "meta-llama/llama-3.1-70b-instruct",
            "meta-llama/llama-3.2-90b-vision-instruct",
        ],
        "mistralai/mistral-7b-instruct" => {
            vec!["mistralai/mistral-large", "mistralai/mixtral-8x7b-instruct"]
        }
        "google/gemma-7b-it" => vec!["google/gemini-pro", "google/gemma-2-27b-it"],
        _ => vec![
            "anthropic/claude-3.5-sonnet",
            "openai/gpt-4o",
            "meta-llama/llama-3.2-90b-vision-instruct",
        ],
    }
}

pub fn rate_limit_message(model_id: &str, detail: &str) -> String {
    if !detail.contains("upstream") {
        return format!("Rate limit exceeded after {MAX_ATTEMPTS} attempts: {detail}");
    }

    let short_name = model_id.rsplit('/').next().unwrap_or(model_id);
    let is_free = model_id.contains(":free");
    let mut suggestions = vec![
        "1. Use a paid model (not ending in ':free') - your credits will work normally".to_string(),
        "2. Wait a few minutes and try again".to_string(),
        "3. Use direct API mode instead of OpenRouter".to_string(),
    ];
    if is_free {
        suggestions.insert(
            1,
            format!(
                "   Try these paid alternatives: {}",
                paid_alternatives(model_id).join(", ")
            ),
        );
        suggestions.push(
            "4. Free models have upstream rate limits regardless of your credits".to_string(),
        );
        suggestions.push(
            "5. Add your own API key at https://openrouter.ai/settings/integrations".to_string(),
        );
    }
    format!(
        "The model '{short_name}' is temporarily rate-limited. Please try:\n{}",
        suggestions.join("\n")
    )
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    endpoint: ApiEndpoint,
    model_id: String,
    identifier: String,
    retry_base_delay: Duration,
}

impl OpenRouterClient {
    pub fn new(endpoint: ApiEndpoint, model_id: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_id: model_id.into(),
            identifier: identifier.into(),
            retry_base_delay: DEFAULT_RETRY_BASE_DELAY,
        }
    }

    /// Accepts an exact id (`vendor/model`) or a search term, then logs any account warnings.
    pub async fn connect(endpoint: ApiEndpoint, identifier: &str) -> Result<Self> {
        let identifier = identifier.trim();
        let model_id = if identifier.contains('/') {
            identifier.to_string()
        } else {
            find_model(&endpoint, identifier).await
        };
        let client = Self::new(endpoint, model_id, identifier);

        match check_account_status(&client.endpoint).await {
            Ok(status) => {
                for warning in account_warnings(&client.model_id, &status) {
                    tracing::warn!(
                        model = %client.model_id,
                        usage = status.usage,
                        limit = ?status.limit,
                        "{}",
                        warning
                    );
                }
            }
            Err(err) => tracing::info!(error = %err, "unable to check OpenRouter account status"),
        }
        Ok(client)
    }

    pub fn with_retry_base_delay(mut self, delay: Duration) -> Self {
        self.retry_base_delay = delay;
        self
    }

    fn failure(&self, message: String) -> anyhow::Error {
        PoetryError::api(Provider::Openrouter.label(), message).into()
    }
}

#[async_trait]
impl LlmClient for OpenRouterClient {
    fn provider(&self) -> Provider {
        Provider::Openrouter
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn model_name(&self) -> &str {
        &self.identifier
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let max_tokens = checked_request(Provider::Openrouter, &self.model_id, max_tokens)?;
        let body = ChatCompletionRequest {
            model: &self.model_id,
            messages: user_message(prompt),
            max_tokens: Some(max_tokens),
            max_completion_tokens: None,
            temperature: Some(TEMPERATURE),
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        };

        for attempt in 0..MAX_ATTEMPTS {
            let response = self
                .endpoint
                .http
                .post(self.endpoint.url("chat/completions"))
                .bearer_auth(&self.endpoint.api_key)
                .header("HTTP-Referer", REFERER)
                .header("X-Title", APP_TITLE)
                .json(&body)
                .send()
                .await
                .map_err(|err| {
                    self.failure(format!("Error generating poetry with OpenRouter: {err}"))
                })?;

            match response.status() {
                status if status.is_success() => {
                    let parsed: ChatCompletionResponse = response.json().await.map_err(|err| {
                        self.failure(format!("Error generating poetry with OpenRouter: {err}"))
                    })?;
                    return parsed.into_text().ok_or_else(|| {
                        self.failure(
                            "Error generating poetry with OpenRouter: response contained no text"
                                .to_string(),
                        )
                    });
                }
                StatusCode::TOO_MANY_REQUESTS => {
                    let detail = error_detail(response).await;
                    if attempt + 1 < MAX_ATTEMPTS {
                        let delay = self.retry_base_delay * 2u32.pow(attempt);
                        tracing::warn!(
                            model = %self.model_id,
                            attempt = attempt + 1,
                            max_attempts = MAX_ATTEMPTS,
                            delay_ms = delay.as_millis() as u64,
                            "rate limited by OpenRouter, retrying"
                        );
                        tokio::time::sleep(delay).await;
                        continue;
                    }
                    return Err(self.failure(rate_limit_message(&self.model_id, &detail)));
                }
                StatusCode::UNAUTHORIZED => {
                    return Err(self.failure(
                        "OpenRouter API authentication failed. Please check your OPENROUTER_API_KEY"
                            .to_string(),
                    ));
                }
                StatusCode::NOT_FOUND => {
                    return Err(self.failure(format!(
                        "Model '{}' not found. Please check the model name or try a different model",
                        self.model_id
                    )));
                }
                _ => {
                    let detail = error_detail(response).await;
                    return Err(
                        self.failure(format!("Error generating poetry with OpenRouter: {detail}"))
                    );
                }
            }
        }

        Err(self.failure("Maximum retry attempts exceeded".to_string()))
    }

    async fn list_available_models(&self, limit: Option<usize>) -> Result<ModelCatalog> {
        list_models(&self.endpoint, limit).await
    }
}
