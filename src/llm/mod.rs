/// Provider adapters behind a single "generate text from a prompt" contract.
///
/// Each adapter owns an [`ApiEndpoint`] (shared HTTP client, base URL, key) and
/// knows how to list its vendor's models. Listing never needs a constructed
/// client, so the CLI and web server can show catalogs before a model is chosen.
pub mod anthropic;
pub mod gemini;
pub mod openai;
pub mod openrouter;

use anyhow::Result;
use async_trait::async_trait;
use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::cli::Provider;
use crate::error::PoetryError;
use crate::security::{validate_max_tokens, validate_model_parameter};

pub const CONNECTION_TEST_PROMPT: &str = "Write a simple two-word poem.";
pub const DEFAULT_MODEL_LIMIT: usize = 6;
pub const TEMPERATURE: f32 = 0.7;

#[async_trait]
pub trait LlmClient: Send + Sync {
    fn provider(&self) -> Provider;

    /// Wire identifier sent to the vendor.
    fn model_id(&self) -> &str;

    /// Human-facing name: a catalog display name, or the OpenRouter id/search term.
    fn model_name(&self) -> &str;

    async fn generate(&self, prompt: &str, max_tokens: u32) -> Result<String>;

    async fn list_available_models(&self, limit: Option<usize>) -> Result<ModelCatalog>;

    async fn test_connection(&self) -> bool {
        match self.generate(CONNECTION_TEST_PROMPT, 10).await {
            Ok(text) => !text.trim().is_empty(),
            Err(err) => {
                tracing::warn!(
                    provider = self.provider().label(),
                    model = self.model_id(),
                    error = %err,
                    "connection test failed"
                );
                false
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiEndpoint {
    pub http: reqwest::Client,
    pub base_url: String,
    pub api_key: String,
}

impl ApiEndpoint {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelEntry {
    pub name: String,
    pub id: String,
}

/// Display name to model id, in the order the provider ranked them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelCatalog {
    entries: Vec<ModelEntry>,
}

impl ModelCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, N, M>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (N, M)>,
        N: Into<String>,
        M: Into<String>,
    {
        let mut catalog = Self::new();
        for (name, id) in pairs {
            catalog.insert(name, id);
        }
        catalog
    }

    /// Inserts or replaces by display name; a replaced entry keeps its position.
    pub fn insert(&mut self, name: impl Into<String>, id: impl Into<String>) {
        let name = name.into();
        let id = id.into();
        if let Some(existing) = self.entries.iter_mut().find(|entry| entry.name == name) {
            existing.id = id;
        } else {
            self.entries.push(ModelEntry { name, id });
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ModelEntry> {
        self.entries.iter()
    }

    pub fn first(&self) -> Option<&ModelEntry> {
        self.entries.first()
    }

    pub fn truncate(&mut self, limit: usize) {
        self.entries.truncate(limit);
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.name.clone()).collect()
    }

    pub fn id_for_name(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.id.as_str())
    }

    /// Exact display name, then exact id, then a case-insensitive display name.
    pub fn resolve(&self, selection: &str) -> Option<&ModelEntry> {
        let selection = selection.trim();
        self.entries
            .iter()
            .find(|entry| entry.name == selection)
            .or_else(|| self.entries.iter().find(|entry| entry.id == selection))
            .or_else(|| {
                self.entries
                    .iter()
                    .find(|entry| entry.name.eq_ignore_ascii_case(selection))
            })
    }
}

impl Serialize for ModelCatalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, &entry.id)?;
        }
        map.end()
    }
}

#[derive(Debug, serde::Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

pub(crate) fn user_message(prompt: &str) -> Vec<ChatMessage<'_>> {
    vec![ChatMessage {
        role: "user",
        content: prompt,
    }]
}

/// Validates the model id and clamps the token budget before any request leaves the process.
pub(crate) fn checked_request(provider: Provider, model_id: &str, max_tokens: u32) -> Result<u32> {
    validate_model_parameter(model_id)?;
    let (in_range, clamped) = validate_max_tokens(i64::from(max_tokens));
    if !in_range {
        tracing::warn!(
            provider = provider.label(),
            requested = max_tokens,
            clamped,
            "max_tokens outside the supported range, clamping"
        );
    }
    Ok(clamped)
}

pub(crate) fn generation_failed(provider: Provider, detail: impl std::fmt::Display) -> anyhow::Error {
    PoetryError::api(provider.label(), format!("Poetry generation failed: {detail}")).into()
}

/// Turns a non-success response into `"<status>: <body>"`, consuming the body.
pub(crate) async fn error_detail(response: reqwest::Response) -> String {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{status}: {body}")
    }
}

/// Applies the caller's limit, or the provider default when none is given.
pub(crate) fn apply_limit(mut catalog: ModelCatalog, limit: Option<usize>) -> ModelCatalog {
    let limit = limit.unwrap_or(DEFAULT_MODEL_LIMIT);
    if limit > 0 {
        catalog.truncate(limit);
    }
    catalog
}
