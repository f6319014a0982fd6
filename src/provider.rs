use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::ValueEnum;
use serde::Serialize;

pub use crate::cli::Provider;
use crate::config::RuntimeConfig;
use crate::error::PoetryError;
use crate::llm::anthropic::{self, ClaudeClient};
use crate::llm::gemini::{self, GeminiClient};
use crate::llm::openai::{self, OpenAiClient};
use crate::llm::openrouter::{self, OpenRouterClient};
use crate::llm::{ApiEndpoint, LlmClient, ModelCatalog};
use crate::security::validate_model_parameter;

/// Search term used when an OpenRouter agent has no model configured.
pub const DEFAULT_OPENROUTER_SEARCH: &str = "Claude";
/// How many models a direct provider lists when resolving a selection.
const RESOLVE_LIMIT: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Company {
    Anthropic,
    Google,
    OpenAI,
}

/// Judge companies in preference order.
pub const JUDGE_PRIORITY: [Company; 3] = [Company::Google, Company::Anthropic, Company::OpenAI];

impl Company {
    pub fn label(self) -> &'static str {
        match self {
            Company::Anthropic => "Anthropic",
            Company::Google => "Google",
            Company::OpenAI => "OpenAI",
        }
    }

    pub fn direct_provider(self) -> Provider {
        match self {
            Company::Anthropic => Provider::Claude,
            Company::Google => Provider::Gemini,
            Company::OpenAI => Provider::Openai,
        }
    }

    pub fn from_openrouter_model(model_id: &str) -> Option<Company> {
        if model_id.starts_with("anthropic/") {
            Some(Company::Anthropic)
        } else if model_id.starts_with("google/") || model_id.starts_with("google-") {
            Some(Company::Google)
        } else if model_id.starts_with("openai/") {
            Some(Company::OpenAI)
        } else {
            None
        }
    }

    pub fn openrouter_search_terms(self) -> &'static [&'static str] {
        match self {
            Company::Google => &["google", "gemini"],
            Company::Anthropic => &["anthropic", "claude"],
            Company::OpenAI => &["openai", "gpt"],
        }
    }
}

impl Provider {
    pub const ALL: [Provider; 4] = [
        Provider::Claude,
        Provider::Gemini,
        Provider::Openai,
        Provider::Openrouter,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Provider::Claude => "Claude",
            Provider::Gemini => "Gemini",
            Provider::Openai => "OpenAI",
            Provider::Openrouter => "OpenRouter",
        }
    }

    pub fn api_key_env(self) -> &'static str {
        match self {
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Openai => "OPENAI_API_KEY",
            Provider::Openrouter => "OPENROUTER_API_KEY",
        }
    }

    /// The vendor behind a direct provider; OpenRouter routes to many.
    pub fn company(self) -> Option<Company> {
        match self {
            Provider::Claude => Some(Company::Anthropic),
            Provider::Gemini => Some(Company::Google),
            Provider::Openai => Some(Company::OpenAI),
            Provider::Openrouter => None,
        }
    }
}

pub fn env_present(key: &str) -> bool {
    std::env::var(key)
        .map(|v| !v.trim().is_empty())
        .unwrap_or(false)
}

pub fn parse_provider_name(value: &str) -> Result<Provider> {
    Provider::from_str(value.trim(), true).map_err(|_| {
        anyhow::anyhow!(
            "invalid provider '{}'. Supported values: claude, gemini, openai, openrouter",
            value
        )
    })
}

pub fn read_api_key(provider: Provider) -> Result<String> {
    let var = provider.api_key_env();
    std::env::var(var)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| {
            PoetryError::Configuration(format!("{var} environment variable is required")).into()
        })
}

/// One shared HTTP client plus per-provider base URLs.
#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub client: reqwest::Client,
    pub anthropic_base_url: String,
    pub gemini_base_url: String,
    pub openai_base_url: String,
    pub openrouter_base_url: String,
}

impl HttpSettings {
    pub fn new(request_timeout_secs: u64) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(request_timeout_secs.max(1)))
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            anthropic_base_url: anthropic::DEFAULT_BASE_URL.to_string(),
            gemini_base_url: gemini::DEFAULT_BASE_URL.to_string(),
            openai_base_url: openai::DEFAULT_BASE_URL.to_string(),
            openrouter_base_url: openrouter::DEFAULT_BASE_URL.to_string(),
        })
    }

    pub fn from_runtime(cfg: &RuntimeConfig) -> Result<Self> {
        Self::new(cfg.request_timeout_secs)
    }

    /// Points every provider at the same base URL; used against local stubs.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.anthropic_base_url = base_url.to_string();
        self.gemini_base_url = base_url.to_string();
        self.openai_base_url = base_url.to_string();
        self.openrouter_base_url = base_url.to_string();
        self
    }

    pub fn base_url(&self, provider: Provider) -> &str {
        match provider {
            Provider::Claude => &self.anthropic_base_url,
            Provider::Gemini => &self.gemini_base_url,
            Provider::Openai => &self.openai_base_url,
            Provider::Openrouter => &self.openrouter_base_url,
        }
    }

    pub fn endpoint(&self, provider: Provider) -> Result<ApiEndpoint> {
        Ok(ApiEndpoint::new(
            self.client.clone(),
            self.base_url(provider),
            read_api_key(provider)?,
        ))
    }
}

/// Lists a provider's models. Direct providers fall back to a built-in list;
/// OpenRouter listing failures are returned to the caller.
pub async fn list_models(
    provider: Provider,
    settings: &HttpSettings,
    limit: Option<usize>,
) -> Result<ModelCatalog> {
    let endpoint = settings.endpoint(provider)?;
    match provider {
        Provider::Claude => Ok(anthropic::list_models(&endpoint, limit).await),
        Provider::Gemini => Ok(gemini::list_models(&endpoint, limit).await),
        Provider::Openai => Ok(openai::list_models(&endpoint, limit).await),
        Provider::Openrouter => openrouter::list_models(&endpoint, limit).await,
    }
}

/// Picks the catalog entry for a selection; `None` takes the provider's first model.
pub fn resolve_selection(
    provider: Provider,
    catalog: &ModelCatalog,
    selection: Option<&str>,
) -> Result<(String, String)> {
    let entry = match selection {
        None => catalog.first(),
        Some(selection) => catalog.resolve(selection),
    };
    match entry {
        Some(entry) => Ok((entry.id.clone(), entry.name.clone())),
        None => Err(PoetryError::ModelNotAvailable {
            model: selection.unwrap_or("<default>").to_string(),
            provider: provider.label().to_string(),
            available: catalog.names(),
        }
        .into()),
    }
}

pub async fn build_client(
    provider: Provider,
    model: Option<&str>,
    settings: &HttpSettings,
) -> Result<Arc<dyn LlmClient>> {
    let endpoint = settings.endpoint(provider)?;
    let model = model.map(str::trim).filter(|value| !value.is_empty());

    let client: Arc<dyn LlmClient> = match provider {
        Provider::Openrouter => {
            let identifier = model.unwrap_or(DEFAULT_OPENROUTER_SEARCH);
            if identifier.contains('/') {
                validate_model_parameter(identifier)?;
            }
            Arc::new(OpenRouterClient::connect(endpoint, identifier).await?)
        }
        Provider::Claude => {
            let catalog = anthropic::list_models(&endpoint, Some(RESOLVE_LIMIT)).await;
            let (id, name) = resolve_selection(provider, &catalog, model)?;
            Arc::new(ClaudeClient::new(endpoint, id, name))
        }
        Provider::Gemini => {
            let catalog = gemini::list_models(&endpoint, Some(RESOLVE_LIMIT)).await;
            let (id, name) = resolve_selection(provider, &catalog, model)?;
            Arc::new(GeminiClient::new(endpoint, id, name))
        }
        Provider::Openai => {
            let catalog = openai::list_models(&endpoint, Some(RESOLVE_LIMIT)).await;
            let (id, name) = resolve_selection(provider, &catalog, model)?;
            Arc::new(OpenAiClient::new(endpoint, id, name))
        }
    };

    tracing::info!(
        provider = provider.label(),
        model = client.model_id(),
        "created LLM client"
    );
    Ok(client)
}

/// Label recorded as `llm_used` on each conversation turn.
pub fn client_display_name(provider: Provider, model_name: &str) -> String {
    format!("{} ({})", provider.label(), model_name)
}

/// Seam between callers that need agent clients and the code that builds them.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn list_models(&self, provider: Provider, limit: Option<usize>) -> Result<ModelCatalog>;

    async fn build(&self, provider: Provider, model: Option<&str>) -> Result<Arc<dyn LlmClient>>;
}

#[async_trait]
impl ClientFactory for HttpSettings {
    async fn list_models(&self, provider: Provider, limit: Option<usize>) -> Result<ModelCatalog> {
        list_models(provider, self, limit).await
    }

    async fn build(&self, provider: Provider, model: Option<&str>) -> Result<Arc<dyn LlmClient>> {
        build_client(provider, model, self).await
    }
}
