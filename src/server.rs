use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::{Path as UrlPath, State};
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router as AxumRouter};
use serde::Serialize;
use serde_json::{Value, json};

use crate::cli::provider_slug;
use crate::config::{AgentChoice, DialogueConfig, RuntimeConfig, parse_form, resolve_poem_length};
use crate::critique::{JudgeFactory, LiveJudgeFactory};
use crate::error::PoetryError;
use crate::llm::ModelCatalog;
use crate::pipeline::generate_and_save;
use crate::provider::{ClientFactory, HttpSettings, Provider, parse_provider_name};
use crate::security::{redact_secrets, sanitize_prompt};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Model used for the non-OpenRouter poet when the other poet is on OpenRouter.
pub const OPENROUTER_STAND_IN_MODEL: &str = "anthropic/claude-3.5-sonnet";

const REQUIRED_FIELDS: [&str; 7] = [
    "poet1Provider",
    "poet1Model",
    "poet2Provider",
    "poet2Model",
    "theme",
    "form",
    "conversationLength",
];

const BUILTIN_INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Poetry Agents</title>
<style>
body { font-family: Georgia, serif; max-width: 40rem; margin: 2rem auto; }
label { display: block; margin-top: 0.75rem; }
</style>
</head>
<body>
<h1>Poetry Agents</h1>
<form id="poetry-form">
  <label>Poet 1 provider <select name="poet1Provider" class="provider"></select></label>
  <label>Poet 1 model <select name="poet1Model"></select></label>
  <label>Poet 2 provider <select name="poet2Provider" class="provider"></select></label>
  <label>Poet 2 model <select name="poet2Model"></select></label>
  <label>Theme <input name="theme" required></label>
  <label>Form
    <select name="form">
      <option>haiku</option><option>prose</option><option>sonnet</option><option>villanelle</option>
      <option>limerick</option><option>ballad</option><option>ghazal</option><option>tanka</option>
    </select>
  </label>
  <label>Rounds <input name="conversationLength" type="number" min="1" value="1"></label>
  <label><input name="useEmojis" type="checkbox"> Emojis</label>
  <label><input name="critique" type="checkbox"> Judge critique</label>
  <button type="submit">Generate</button>
</form>
<p id="status"></p>
<script>
const providers = ["claude", "gemini", "openai", "openrouter"];
async function loadModels(providerSelect) {
  const modelSelect = providerSelect.form.elements[providerSelect.name.replace("Provider", "Model")];
  modelSelect.innerHTML = "";
  const response = await fetch(`/api/models/${providerSelect.value}`);
  const models = await response.json();
  for (const [name, id] of Object.entries(models)) {
    if (name === "error") continue;
    modelSelect.add(new Option(name, id));
  }
}
for (const select of document.querySelectorAll("select.provider")) {
  providers.forEach((p) => select.add(new Option(p, p)));
  select.addEventListener("change", () => loadModels(select));
}
document.querySelector("select[name=poet2Provider]").value = "gemini";
document.querySelectorAll("select.provider").forEach(loadModels);
document.getElementById("poetry-form").addEventListener("submit", async (event) => {
  event.preventDefault();
  const form = event.target;
  const body = Object.fromEntries(new FormData(form));
  body.useEmojis = form.elements.useEmojis.checked;
  body.critique = form.elements.critique.checked;
  const status = document.getElementById("status");
  status.textContent = "Generating...";
  const response = await fetch("/api/generate", {
    method: "POST",
    headers: { "Content-Type": "application/json" },
    body: JSON.stringify(body),
  });
  const result = await response.json();
  status.innerHTML = result.success
    ? `<a href="/download/${result.filename}">Download ${result.filename}</a>`
    : result.error;
});
</script>
</body>
</html>
"#;

#[derive(Clone)]
pub struct ServerState {
    pub cfg: RuntimeConfig,
    pub telemetry: TelemetrySink,
    pub clients: Arc<dyn ClientFactory>,
    pub judges: Arc<dyn JudgeFactory>,
}

#[derive(Debug, Serialize)]
pub struct ServerHealthResponse {
    pub status: &'static str,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub success: bool,
    pub filename: String,
    pub full_path: String,
}

/// `/api/generate` body after required-field checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebGenerateRequest {
    pub poet1_provider: String,
    pub poet1_model: String,
    pub poet2_provider: String,
    pub poet2_model: String,
    pub theme: String,
    pub form: String,
    pub conversation_length: String,
    pub use_emojis: bool,
    pub critique: bool,
}

pub type ApiError = (StatusCode, Json<Value>);
pub type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

pub fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (status, Json(json!({ "error": message.into() })))
}

/// Strings and numbers are accepted; absent, null, blank, `false` and `0` count as missing.
fn field_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(text) if !text.trim().is_empty() => Some(text.trim().to_string()),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

fn field_flag(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Bool(flag)) => *flag,
        Some(Value::String(text)) => matches!(text.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1"),
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        _ => false,
    }
}

impl WebGenerateRequest {
    /// Errors with the name of the first missing required field.
    pub fn from_json(body: &Value) -> std::result::Result<Self, String> {
        let mut values = Vec::with_capacity(REQUIRED_FIELDS.len());
        for field in REQUIRED_FIELDS {
            match field_text(body.get(field)) {
                Some(value) => values.push(value),
                None => return Err(field.to_string()),
            }
        }
        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        Ok(Self {
            poet1_provider: next(),
            poet1_model: next(),
            poet2_provider: next(),
            poet2_model: next(),
            theme: next(),
            form: next(),
            conversation_length: next(),
            use_emojis: field_flag(body.get("useEmojis")),
            critique: field_flag(body.get("critique")),
        })
    }
}

pub fn web_request_to_config(request: &WebGenerateRequest) -> Result<DialogueConfig> {
    let poet1 = parse_provider_name(&request.poet1_provider)?;
    let poet2 = parse_provider_name(&request.poet2_provider)?;
    let form = parse_form(&request.form)?;
    let conversation_length = request
        .conversation_length
        .parse::<u32>()
        .map_err(|_| {
            PoetryError::Validation(format!(
                "conversationLength must be a positive number, got '{}'",
                request.conversation_length
            ))
        })?;
    let (poem_length, length_unit) = resolve_poem_length(form, None);

    let use_openrouter = poet1 == Provider::Openrouter || poet2 == Provider::Openrouter;
    let agent = |provider: Provider, model: &str| {
        if !use_openrouter {
            AgentChoice::new(provider, Some(model))
        } else if provider == Provider::Openrouter {
            AgentChoice::new(Provider::Openrouter, Some(model))
        } else {
            AgentChoice::new(Provider::Openrouter, Some(OPENROUTER_STAND_IN_MODEL))
        }
    };

    let config = DialogueConfig {
        theme: request.theme.clone(),
        num_agents: 2,
        form,
        poem_length,
        length_unit,
        conversation_length,
        use_openrouter,
        use_emojis: request.use_emojis,
        use_critique: request.critique,
        output_format: "markdown".to_string(),
        agents: vec![
            agent(poet1, &request.poet1_model),
            agent(poet2, &request.poet2_model),
        ],
    };
    config.validate()?;
    Ok(config)
}

/// Rejects anything that could leave the output directory.
pub fn is_safe_filename(filename: &str) -> bool {
    !filename.is_empty()
        && !filename.contains("..")
        && !filename.contains('/')
        && !filename.contains('\\')
        && !filename.contains('\0')
        && Path::new(filename).file_name().is_some()
}

pub async fn handle_index() -> Html<String> {
    match tokio::fs::read_to_string("index.html").await {
        Ok(page) => Html(page),
        Err(_) => Html(BUILTIN_INDEX_HTML.to_string()),
    }
}

pub async fn handle_health() -> Json<ServerHealthResponse> {
    Json(ServerHealthResponse {
        status: "healthy",
        timestamp: chrono::Local::now().to_rfc3339(),
    })
}

pub async fn handle_models(
    State(state): State<Arc<ServerState>>,
    UrlPath(provider): UrlPath<String>,
) -> ApiResult<ModelCatalog> {
    let provider = parse_provider_name(&provider)
        .map_err(|_| api_error(StatusCode::BAD_REQUEST, "Unknown provider"))?;
    let catalog = state
        .clients
        .list_models(provider, None)
        .await
        .map_err(|err| {
            tracing::error!(provider = provider_slug(provider), error = %err, "model listing failed");
            api_error(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to load models: {err}"),
            )
        })?;
    Ok(Json(catalog))
}

pub async fn handle_generate(
    State(state): State<Arc<ServerState>>,
    Json(body): Json<Value>,
) -> ApiResult<GenerateResponse> {
    let request = WebGenerateRequest::from_json(&body).map_err(|field| {
        api_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required field: {field}"),
        )
    })?;

    let sanitized = sanitize_prompt(&request.theme);
    if !sanitized.warnings.is_empty() {
        tracing::warn!(
            theme = %redact_secrets(&request.theme),
            warnings = ?sanitized.warnings,
            "theme matched sanitizer patterns"
        );
    }

    let config = web_request_to_config(&request)
        .map_err(|err| api_error(StatusCode::BAD_REQUEST, err.to_string()))?;

    let output_dir = PathBuf::from(&state.cfg.output_dir);
    let (_, path) = generate_and_save(
        &config,
        state.clients.as_ref(),
        state.judges.clone(),
        &output_dir,
        None,
        &state.telemetry,
    )
    .await
    .map_err(|err| {
        tracing::error!(error = %err, "poetry generation error");
        api_error(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Poetry generation failed: {err}"),
        )
    })?;

    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    state.telemetry.emit(TelemetryEvent::ServerGenerate {
        filename: filename.clone(),
        use_openrouter: config.use_openrouter,
        critique: config.use_critique,
    });

    Ok(Json(GenerateResponse {
        success: true,
        filename,
        full_path: path.display().to_string(),
    }))
}

pub async fn handle_download(
    State(state): State<Arc<ServerState>>,
    UrlPath(filename): UrlPath<String>,
) -> std::result::Result<Response, ApiError> {
    if !is_safe_filename(&filename) {
        return Err(api_error(StatusCode::BAD_REQUEST, "Invalid filename"));
    }
    let path = Path::new(&state.cfg.output_dir).join(&filename);
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| api_error(StatusCode::NOT_FOUND, "File not found"))?;

    let headers = [
        (header::CONTENT_TYPE, "text/markdown; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{filename}\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

pub async fn handle_not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Endpoint not found")
}

pub fn build_server_router(state: Arc<ServerState>) -> AxumRouter {
    AxumRouter::new()
        .route("/", get(handle_index))
        .route("/api/health", get(handle_health))
        .route("/api/models/{provider}", get(handle_models))
        .route("/api/generate", post(handle_generate))
        .route("/download/{filename}", get(handle_download))
        .fallback(handle_not_found)
        .with_state(state)
}

pub async fn run_server(
    cfg: RuntimeConfig,
    host: String,
    port: u16,
    telemetry: &TelemetrySink,
) -> Result<()> {
    let addr = format!("{host}:{port}")
        .parse::<SocketAddr>()
        .with_context(|| format!("invalid server bind address '{}:{}'", host, port))?;
    let settings = HttpSettings::from_runtime(&cfg)?;
    let state = Arc::new(ServerState {
        cfg: cfg.clone(),
        telemetry: telemetry.clone(),
        clients: Arc::new(settings.clone()),
        judges: Arc::new(LiveJudgeFactory::new(settings)),
    });

    telemetry.emit(TelemetryEvent::ServerStarted {
        host: host.clone(),
        port,
        profile: cfg.profile.clone(),
        output_dir: cfg.output_dir.clone(),
    });

    println!(
        "Poetry Agents web interface on http://{} (health: /api/health, generate: /api/generate)",
        addr
    );

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind server listener")?;
    axum::serve(listener, build_server_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server runtime failed")
}

pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %err, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => { println!("\nReceived Ctrl+C, shutting down gracefully..."); }
        _ = terminate => { println!("\nReceived SIGTERM, shutting down gracefully..."); }
    }
}
