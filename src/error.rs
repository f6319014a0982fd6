use thiserror::Error;

#[derive(Debug, Error)]
pub enum PoetryError {
    #[error("{provider} API Error: {message}")]
    Api { provider: String, message: String },
    #[error("{0}")]
    Configuration(String),
    #[error("Model '{model}' not available for {provider}. Available models: {}", available.join(", "))]
    ModelNotAvailable {
        model: String,
        provider: String,
        available: Vec<String>,
    },
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    FileOperation(String),
    #[error("{0}")]
    PromptGeneration(String),
}

impl PoetryError {
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        PoetryError::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Provider,
    Config,
    Input,
    Output,
    Internal,
}

impl ErrorCategory {
    pub fn code(self) -> &'static str {
        match self {
            ErrorCategory::Provider => "PROVIDER",
            ErrorCategory::Config => "CONFIG",
            ErrorCategory::Input => "INPUT",
            ErrorCategory::Output => "OUTPUT",
            ErrorCategory::Internal => "INTERNAL",
        }
    }

    pub fn hint(self) -> &'static str {
        match self {
            ErrorCategory::Provider => {
                "Check the provider API key and model id, or run poetry-agents doctor --check-connections."
            }
            ErrorCategory::Config => {
                "Set the provider key (for example ANTHROPIC_API_KEY) and review .poetry-agents/config.toml."
            }
            ErrorCategory::Input => "Run poetry-agents --help and correct command arguments.",
            ErrorCategory::Output => "Check that the output directory exists and is writable.",
            ErrorCategory::Internal => {
                "Retry with RUST_LOG=debug. If it persists, capture logs and open an issue."
            }
        }
    }
}

pub fn categorize_error(err: &anyhow::Error) -> ErrorCategory {
    if let Some(poetry_err) = err.chain().find_map(|e| e.downcast_ref::<PoetryError>()) {
        return match poetry_err {
            PoetryError::Api { .. } | PoetryError::ModelNotAvailable { .. } => {
                ErrorCategory::Provider
            }
            PoetryError::Configuration(_) => ErrorCategory::Config,
            PoetryError::Validation(_) | PoetryError::PromptGeneration(_) => ErrorCategory::Input,
            PoetryError::FileOperation(_) => ErrorCategory::Output,
        };
    }

    let msg = format!("{err:#}").to_ascii_lowercase();

    if msg.contains("api_key") || msg.contains("provider") || msg.contains("api error") {
        return ErrorCategory::Provider;
    }

    if msg.contains("profile") || msg.contains("config") {
        return ErrorCategory::Config;
    }

    if msg.contains("invalid value")
        || msg.contains("unknown argument")
        || msg.contains("failed to read input")
    {
        return ErrorCategory::Input;
    }

    if msg.contains("failed to write") || msg.contains("failed to create") {
        return ErrorCategory::Output;
    }

    ErrorCategory::Internal
}

pub fn format_cli_error(err: &anyhow::Error) -> String {
    let category = categorize_error(err);
    format!(
        "[{}] {}\nHint: {}",
        category.code(),
        redact_sensitive_text(&format!("{err:#}")),
        category.hint()
    )
}

const SECRET_PREFIXES: &[&str] = &["sk-", "AIza", "key="];

/// Replaces API-key shaped tokens in `text` so rendered errors never echo credentials.
pub fn redact_sensitive_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut cursor = 0usize;

    while let Some((offset, prefix)) = next_secret_prefix(&text[cursor..]) {
        let start = cursor + offset;
        out.push_str(&text[cursor..start]);

        let remainder = &text[start..];
        let end = remainder
            .find(|ch: char| {
                ch.is_whitespace()
                    || matches!(
                        ch,
                        '"' | '\'' | '(' | ')' | '[' | ']' | '{' | '}' | ',' | ';' | '&'
                    )
            })
            .unwrap_or(remainder.len());
        let token = &remainder[..end];
        if token.len() - prefix.len() >= 16 {
            out.push_str(prefix);
            out.push_str("[REDACTED]");
        } else {
            out.push_str(token);
        }
        cursor = start + end.max(prefix.len());
    }

    out.push_str(&text[cursor..]);
    out
}

fn next_secret_prefix(text: &str) -> Option<(usize, &'static str)> {
    SECRET_PREFIXES
        .iter()
        .filter_map(|prefix| text.find(prefix).map(|idx| (idx, *prefix)))
        .min_by_key(|(idx, _)| *idx)
}
