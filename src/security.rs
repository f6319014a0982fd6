/// Input validation for values that reach provider APIs.
///
/// Model ids and token budgets are validated strictly because they are placed
/// into request bodies and URLs. Prompt sanitization is cosmetic: it trims,
/// truncates, and masks a few well-known phrases so logs stay readable. It is
/// not a prompt-injection defense and callers must not rely on it as one.
use std::sync::LazyLock;

use anyhow::Result;
use regex::Regex;

use crate::error::PoetryError;

pub const MAX_PROMPT_CHARS: usize = 10_000;
pub const MAX_MODEL_ID_CHARS: usize = 200;
pub const MIN_MAX_TOKENS: u32 = 1;
pub const MAX_MAX_TOKENS: u32 = 8000;

const DANGEROUS_MODEL_CHARS: &[char] = &[
    ';', '&', '|', '`', '$', '(', ')', '{', '}', '<', '>', '\n', '\r', '\t',
];

pub(crate) const INJECTION_PATTERNS: &[&str] = &[
    r"ignore\s+previous\s+instructions",
    r"ignore\s+all\s+previous\s+instructions",
    r"forget\s+all\s+previous\s+instructions",
    r"forget\s+previous\s+instructions",
    r"disregard\s+previous\s+instructions",
    r"override\s+previous\s+instructions",
    r"new\s+instructions\s*:",
    r"system\s*:\s*new\s+role",
    r"act\s+as\s+a\s+different",
    r"pretend\s+to\s+be",
    r"you\s+are\s+now",
    r"roleplay\s+as",
    r"simulate\s+being",
    r"reveal\s+your\s+system\s+prompt",
    r"show\s+me\s+your\s+instructions",
    r"what\s+are\s+your\s+instructions",
    r"bypass\s+safety",
    r"disable\s+safety",
    r"break\s+character",
    r"jailbreak",
    r"uncensored\s+mode",
    r"developer\s+mode",
    r"admin\s+override",
    r"sudo\s+mode",
    r"root\s+access",
];

pub(crate) const SUSPICIOUS_PATTERNS: &[&str] = &[
    r"<script[^>]*>",
    r"javascript:",
    r"data:text/html",
    r"eval\s*\(",
    r"exec\s*\(",
    r"import\s+os",
    r"import\s+subprocess",
    r"__import__",
    r"getattr\s*\(",
    r"setattr\s*\(",
    r"delattr\s*\(",
];

fn compile_case_insensitive(patterns: &[&'static str]) -> Vec<(&'static str, Regex)> {
    patterns
        .iter()
        .map(|pattern| {
            let regex = Regex::new(&format!("(?i){pattern}"))
                .expect("prompt screening regex should compile");
            (*pattern, regex)
        })
        .collect()
}

pub(crate) static INJECTION_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_case_insensitive(INJECTION_PATTERNS));
pub(crate) static SUSPICIOUS_REGEXES: LazyLock<Vec<(&'static str, Regex)>> =
    LazyLock::new(|| compile_case_insensitive(SUSPICIOUS_PATTERNS));

pub(crate) static SECRET_REGEXES: LazyLock<Vec<(Regex, &'static str)>> = LazyLock::new(|| {
    [
        (r"\b[a-zA-Z_]{2,15}-[a-zA-Z0-9]{20,}\b", "[API_KEY_REDACTED]"),
        (r"\b[a-zA-Z_]{2,15}_sk_[a-zA-Z0-9]{20,}\b", "[API_KEY_REDACTED]"),
        (r"\b[a-zA-Z0-9]{16,}\b", "[REDACTED]"),
        (r"(?i)\b(password|secret|token)\s*(?:is|=|:)\s*\S+", "$1=[REDACTED]"),
        (r"://[^:/@]+:[^/@]+@", "://[USER]:[REDACTED]@"),
    ]
    .into_iter()
    .map(|(pattern, replacement)| {
        let regex = Regex::new(pattern).expect("secret redaction regex should compile");
        (regex, replacement)
    })
    .collect()
});

/// Checks a model identifier before it is placed into a request URL or body.
pub fn validate_model_parameter(model: &str) -> Result<String> {
    let invalid = || -> anyhow::Error {
        PoetryError::Validation(format!("invalid model identifier '{}'", model.escape_debug()))
            .into()
    };

    if model.is_empty() || model.chars().count() > MAX_MODEL_ID_CHARS {
        return Err(invalid());
    }
    if model
        .chars()
        .any(|ch| DANGEROUS_MODEL_CHARS.contains(&ch) || ch.is_control())
    {
        return Err(invalid());
    }
    if !model
        .chars()
        .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':'))
    {
        return Err(invalid());
    }
    Ok(model.to_string())
}

/// Clamps a token budget into the supported range. The flag is false when the
/// value had to be adjusted.
pub fn validate_max_tokens(max_tokens: i64) -> (bool, u32) {
    if max_tokens < MIN_MAX_TOKENS as i64 {
        return (false, MIN_MAX_TOKENS);
    }
    if max_tokens > MAX_MAX_TOKENS as i64 {
        return (false, MAX_MAX_TOKENS);
    }
    (true, max_tokens as u32)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedPrompt {
    pub is_safe: bool,
    pub content: String,
    pub warnings: Vec<String>,
    pub blocked_patterns: Vec<String>,
}

pub fn sanitize_prompt(prompt: &str) -> SanitizedPrompt {
    let mut warnings = Vec::new();
    let mut blocked_patterns = Vec::new();
    let mut sanitized = prompt.trim().to_string();

    let char_count = sanitized.chars().count();
    if char_count > MAX_PROMPT_CHARS {
        warnings.push(format!(
            "Prompt truncated from {char_count} to {MAX_PROMPT_CHARS} characters"
        ));
        sanitized = sanitized.chars().take(MAX_PROMPT_CHARS).collect();
    }

    if sanitized.is_empty() {
        return SanitizedPrompt {
            is_safe: false,
            content: String::new(),
            warnings: vec!["Empty prompt not allowed".to_string()],
            blocked_patterns,
        };
    }

    for (pattern, regex) in INJECTION_REGEXES.iter() {
        if regex.is_match(&sanitized) {
            blocked_patterns.push(pattern.to_string());
            sanitized = regex.replace_all(&sanitized, "[BLOCKED]").into_owned();
        }
    }

    for (pattern, regex) in SUSPICIOUS_REGEXES.iter() {
        if regex.is_match(&sanitized) {
            blocked_patterns.push(pattern.to_string());
            warnings.push(format!(
                "Suspicious pattern detected and removed: {pattern}"
            ));
            sanitized = regex.replace_all(&sanitized, "[REMOVED]").into_owned();
        }
    }

    sanitized = sanitized
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .chars()
        .filter(|ch| !ch.is_control())
        .collect::<String>()
        .trim()
        .to_string();

    if !blocked_patterns.is_empty() {
        warnings.push(format!(
            "Blocked {} potentially dangerous pattern(s)",
            blocked_patterns.len()
        ));
        tracing::warn!(
            blocked = blocked_patterns.len(),
            "prompt sanitizer masked known injection phrases"
        );
    }

    SanitizedPrompt {
        is_safe: blocked_patterns.is_empty(),
        content: sanitized,
        warnings,
        blocked_patterns,
    }
}

/// Shortens and scrubs user-provided text before it is written to logs.
pub fn redact_secrets(text: &str) -> String {
    let mut safe = text.chars().take(100).collect::<String>();
    for (regex, replacement) in SECRET_REGEXES.iter() {
        safe = regex.replace_all(&safe, *replacement).into_owned();
    }
    safe
}
