use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{
    ApiEndpoint, LlmClient, ModelCatalog, TEMPERATURE, apply_limit, checked_request, error_detail,
    generation_failed,
};
use crate::cli::Provider;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
const TOP_P: f32 = 0.8;
const TOP_K: u32 = 40;

pub fn fallback_models() -> ModelCatalog {
    ModelCatalog::from_pairs([
        ("Gemini 2.5 Pro", "gemini-2.5-pro"),
        ("Gemini 2.5 Flash", "gemini-2.5-flash"),
        ("Gemini 2.5 Flash-Lite", "gemini-2.5-flash-lite"),
        ("Gemini 2.0 Flash", "gemini-2.0-flash"),
        ("Gemini 1.5 Pro", "gemini-1.5-pro"),
        ("Gemini 1.5 Flash", "gemini-1.5-flash"),
    ])
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelsPage {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelInfo {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    supported_generation_methods: Vec<String>,
}

/// Lower sorts first: newer generations, then pro before flash before everything else.
pub fn relevance_rank(model_id: &str) -> (u8, u8) {
    let version = if model_id.contains("2.5") {
        0
    } else if model_id.contains("2.0") {
        1
    } else if model_id.contains("1.5") {
        2
    } else {
        3
    };
    let tier = if model_id.contains("pro") {
        0
    } else if model_id.contains("flash") {
        1
    } else {
        2
    };
    (version, tier)
}

fn rank_models(models: Vec<ModelInfo>) -> ModelCatalog {
    let mut candidates = models
        .into_iter()
        .filter(|model| {
            model
                .supported_generation_methods
                .iter()
                .any(|method| method == "generateContent")
        })
        .map(|model| {
            let id = model
                .name
                .strip_prefix("models/")
                .unwrap_or(&model.name)
                .to_string();
            let name = model.display_name.unwrap_or_else(|| id.clone());
            (name, id)
        })
        .filter(|(_, id)| id.contains("gemini"))
        .collect::<Vec<(String, String)>>();
    candidates.sort_by(|(_, a), (_, b)| relevance_rank(a).cmp(&relevance_rank(b)).then_with(|| a.cmp(b)));
    ModelCatalog::from_pairs(candidates)
}

async fn fetch_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> Result<ModelCatalog> {
    let response = endpoint
        .http
        .get(endpoint.url("v1beta/models"))
        .query(&[("pageSize", "1000")])
        .header("x-goog-api-key", &endpoint.api_key)
        .send()
        .await
        .context("failed to reach the Gemini models endpoint")?;
    if !response.status().is_success() {
        anyhow::bail!("model listing failed: {}", error_detail(response).await);
    }
    let page: ModelsPage = response
        .json()
        .await
        .context("failed to decode Gemini model list")?;
    Ok(apply_limit(rank_models(page.models), limit))
}

pub async fn list_models(endpoint: &ApiEndpoint, limit: Option<usize>) -> ModelCatalog {
    match fetch_models(endpoint, limit).await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => apply_limit(fallback_models(), limit),
        Err(err) => {
            tracing::warn!(provider = "gemini", error = %err, "using built-in model list");
            apply_limit(fallback_models(), limit)
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
    top_p: f32,
    top_k: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Clone)]
pub struct GeminiClient {
    endpoint: ApiEndpoint,
    model_id: String,
    model_name: String,
}

impl GeminiClient {
    pub fn new(endpoint: ApiEndpoint, model_id: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self {
            endpoint,
            model_id: model_id.into(),
            model_name: model_name.into(),
        }
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    fn provider(&self) -> Provider {
        Provider::Gemini
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String> {
        let max_tokens = checked_request(Provider::Gemini, &self.model_id, max_tokens)?;
        let body = GenerateRequest {
            contents: vec![Content {
                role: "user",
                parts: vec![RequestPart { text: prompt }],
            }],
            generation_config: GenerationConfig {
                max_output_tokens: max_tokens,
                temperature: TEMPERATURE,
                top_p: TOP_P,
                top_k: TOP_K,
            },
        };

        let url = self
            .endpoint
            .url(&format!("v1beta/models/{}:generateContent", self.model_id));
        let response = self
            .endpoint
            .http
            .post(url)
            .header("x-goog-api-key", &self.endpoint.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| generation_failed(Provider::Gemini, err))?;
        if !response.status().is_success() {
            return Err(generation_failed(Provider::Gemini, error_detail(response).await));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|err| generation_failed(Provider::Gemini, err))?;
        let text = parsed
            .candidates
            .into_iter()
            .filter_map(|candidate| candidate.content)
            .flat_map(|content| content.parts)
            .filter_map(|part| part.text)
            .collect::<Vec<String>>()
            .join("");
        if text.trim().is_empty() {
            return Err(generation_failed(Provider::Gemini, "response contained no text"));
        }
        Ok(text.trim().to_string())
    }

    async fn list_available_models(&self, limit: Option<usize>) -> Result<ModelCatalog> {
        Ok(list_models(&self.endpoint, limit).await)
    }
}
