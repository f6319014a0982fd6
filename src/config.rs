use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::cli::{Cli, PoetryForm, Provider, form_slug};
use crate::error::PoetryError;
use crate::security::validate_model_parameter;

pub const DEFAULT_OUTPUT_DIR: &str = "outputs";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 120;
pub const DEFAULT_SERVER_HOST: &str = "0.0.0.0";
pub const DEFAULT_SERVER_PORT: u16 = 8080;
/// Upper bound on dialogue rounds; each round costs one model call per agent.
pub const MAX_CONVERSATION_LENGTH: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthUnit {
    Lines,
    Stanzas,
    Couplets,
    Paragraphs,
}

impl LengthUnit {
    pub fn plural(self) -> &'static str {
        match self {
            LengthUnit::Lines => "lines",
            LengthUnit::Stanzas => "stanzas",
            LengthUnit::Couplets => "couplets",
            LengthUnit::Paragraphs => "paragraphs",
        }
    }

    pub fn singular(self) -> &'static str {
        match self {
            LengthUnit::Lines => "line",
            LengthUnit::Stanzas => "stanza",
            LengthUnit::Couplets => "couplet",
            LengthUnit::Paragraphs => "paragraph",
        }
    }

    pub fn label(self, count: u32) -> &'static str {
        if count == 1 {
            self.singular()
        } else {
            self.plural()
        }
    }
}

impl PoetryForm {
    pub const ALL: [PoetryForm; 8] = [
        PoetryForm::Haiku,
        PoetryForm::Prose,
        PoetryForm::Sonnet,
        PoetryForm::Villanelle,
        PoetryForm::Limerick,
        PoetryForm::Ballad,
        PoetryForm::Ghazal,
        PoetryForm::Tanka,
    ];

    pub fn as_str(self) -> &'static str {
        form_slug(self)
    }

    /// Traditional line count for forms whose length is not negotiable.
    pub fn fixed_length(self) -> Option<u32> {
        match self {
            PoetryForm::Haiku => Some(3),
            PoetryForm::Sonnet => Some(14),
            PoetryForm::Villanelle => Some(19),
            PoetryForm::Limerick => Some(5),
            PoetryForm::Tanka => Some(5),
            PoetryForm::Prose | PoetryForm::Ballad | PoetryForm::Ghazal => None,
        }
    }

    pub fn default_length(self) -> u32 {
        match self {
            PoetryForm::Prose => 2,
            PoetryForm::Ballad => 4,
            PoetryForm::Ghazal => 7,
            fixed => fixed.fixed_length().unwrap_or(4),
        }
    }

    pub fn length_unit(self) -> LengthUnit {
        match self {
            PoetryForm::Prose => LengthUnit::Paragraphs,
            PoetryForm::Ballad => LengthUnit::Stanzas,
            PoetryForm::Ghazal => LengthUnit::Couplets,
            _ => LengthUnit::Lines,
        }
    }
}

pub fn valid_form_names() -> Vec<&'static str> {
    PoetryForm::ALL.iter().map(|form| form.as_str()).collect()
}

pub fn parse_form(value: &str) -> Result<PoetryForm> {
    PoetryForm::from_str(value.trim(), true).map_err(|_| {
        PoetryError::Validation(format!(
            "Invalid form: {}. Valid forms: {}",
            value.trim(),
            valid_form_names().join(", ")
        ))
        .into()
    })
}

/// Fixed forms always report their traditional length; variable forms take the
/// request when it is positive and fall back to the form default otherwise.
pub fn resolve_poem_length(form: PoetryForm, requested: Option<u32>) -> (u32, LengthUnit) {
    if let Some(fixed) = form.fixed_length() {
        return (fixed, LengthUnit::Lines);
    }
    let length = requested
        .filter(|value| *value > 0)
        .unwrap_or_else(|| form.default_length());
    (length, form.length_unit())
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct AgentChoice {
    pub provider: Provider,
    /// Display name or model id for direct providers; model id or search term for OpenRouter.
    pub model: Option<String>,
}

impl AgentChoice {
    pub fn new(provider: Provider, model: Option<&str>) -> Self {
        Self {
            provider,
            model: model
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct DialogueConfig {
    pub theme: String,
    pub num_agents: u32,
    pub form: PoetryForm,
    pub poem_length: u32,
    pub length_unit: LengthUnit,
    pub conversation_length: u32,
    pub use_openrouter: bool,
    pub use_emojis: bool,
    #[serde(default)]
    pub use_critique: bool,
    pub output_format: String,
    pub agents: Vec<AgentChoice>,
}

impl Default for DialogueConfig {
    fn default() -> Self {
        Self {
            theme: String::new(),
            num_agents: 2,
            form: PoetryForm::Haiku,
            poem_length: 3,
            length_unit: LengthUnit::Lines,
            conversation_length: 1,
            use_openrouter: false,
            use_emojis: false,
            use_critique: false,
            output_format: "markdown".to_string(),
            agents: vec![
                AgentChoice::new(Provider::Claude, None),
                AgentChoice::new(Provider::Gemini, None),
            ],
        }
    }
}

impl DialogueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.num_agents < 1 {
            return Err(
                PoetryError::Configuration("Number of agents must be at least 1".to_string()).into(),
            );
        }
        if self.poem_length < 1 {
            return Err(
                PoetryError::Configuration("Poem length must be at least 1".to_string()).into(),
            );
        }
        if self.conversation_length < 1 {
            return Err(PoetryError::Configuration(
                "Conversation length must be at least 1".to_string(),
            )
            .into());
        }
        if self.conversation_length > MAX_CONVERSATION_LENGTH {
            return Err(PoetryError::Validation(format!(
                "Conversation length must be at most {MAX_CONVERSATION_LENGTH}, got {}",
                self.conversation_length
            ))
            .into());
        }
        if self.agents.len() != self.num_agents as usize {
            return Err(PoetryError::Configuration(format!(
                "expected {} agent model choices, got {}",
                self.num_agents,
                self.agents.len()
            ))
            .into());
        }
        for (idx, agent) in self.agents.iter().enumerate() {
            if self.use_openrouter && agent.provider != Provider::Openrouter {
                return Err(PoetryError::Configuration(format!(
                    "agent {} must use openrouter when OpenRouter mode is enabled",
                    idx + 1
                ))
                .into());
            }
            if let Some(model) = agent.model.as_deref()
                && !is_model_selection(model)
            {
                return Err(PoetryError::Validation(format!(
                    "agent {} model '{}' contains unsupported characters",
                    idx + 1,
                    model
                ))
                .into());
            }
        }
        Ok(())
    }
}

/// Accepts model ids and display names such as "Claude Sonnet 3.5 (New)". Display
/// names are mapped to ids, and ids are checked again, before anything reaches the wire.
fn is_model_selection(value: &str) -> bool {
    validate_model_parameter(value).is_ok()
        || (value.len() <= 200
            && value
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || " -_.()/:".contains(ch)))
}

#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub profile: String,
    pub config_path: String,
    pub output_dir: String,
    pub request_timeout_secs: u64,
    pub telemetry_enabled: bool,
    pub telemetry_path: String,
    pub server_host: String,
    pub server_port: u16,
    pub form: Option<PoetryForm>,
    pub poem_length: Option<u32>,
    pub conversation_length: Option<u32>,
    pub use_emojis: Option<bool>,
    pub critique: bool,
    pub agent1_provider: Option<Provider>,
    pub agent1_model: Option<String>,
    pub agent2_provider: Option<Provider>,
    pub agent2_model: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfilesFile {
    #[serde(default)]
    pub profiles: HashMap<String, ProfileConfig>,
}

#[derive(Debug, Default, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProfileConfig {
    pub form: Option<PoetryForm>,
    pub poem_length: Option<u32>,
    pub conversation_length: Option<u32>,
    pub use_emojis: Option<bool>,
    pub critique: Option<bool>,
    pub output_dir: Option<String>,
    pub agent1_provider: Option<Provider>,
    pub agent1_model: Option<String>,
    pub agent2_provider: Option<Provider>,
    pub agent2_model: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub telemetry_enabled: Option<bool>,
    pub telemetry_path: Option<String>,
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
}

pub fn load_profiles(config_path: &str) -> Result<ProfilesFile> {
    let path = Path::new(config_path);
    if !path.exists() {
        return Ok(ProfilesFile::default());
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read profile config file at '{}'", path.display()))?;
    toml::from_str::<ProfilesFile>(&content).with_context(|| {
        format!(
            "invalid profile configuration in '{}'. Check form/provider values and field names.",
            path.display()
        )
    })
}

pub fn resolve_runtime_config(cli: &Cli, profiles: &ProfilesFile) -> Result<RuntimeConfig> {
    let selected = cli.profile.trim();
    if selected.is_empty() {
        return Err(anyhow::anyhow!(
            "profile name cannot be empty. Set --profile <name>."
        ));
    }

    let profile = if selected == "default" && !profiles.profiles.contains_key("default") {
        ProfileConfig::default()
    } else {
        profiles.profiles.get(selected).cloned().ok_or_else(|| {
            let mut names = profiles.profiles.keys().cloned().collect::<Vec<String>>();
            names.sort();
            if names.is_empty() {
                anyhow::anyhow!(
                    "profile '{}' not found in '{}'. No profiles are defined yet.",
                    selected,
                    cli.config_path
                )
            } else {
                anyhow::anyhow!(
                    "profile '{}' not found in '{}'. Available profiles: {}",
                    selected,
                    cli.config_path,
                    names.join(", ")
                )
            }
        })?
    };

    Ok(RuntimeConfig {
        profile: selected.to_string(),
        config_path: cli.config_path.clone(),
        output_dir: cli
            .output_dir
            .clone()
            .or(profile.output_dir)
            .unwrap_or_else(|| DEFAULT_OUTPUT_DIR.to_string()),
        request_timeout_secs: cli
            .request_timeout_secs
            .or(profile.request_timeout_secs)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
            .max(1),
        telemetry_enabled: cli
            .telemetry_enabled
            .or(profile.telemetry_enabled)
            .unwrap_or(true),
        telemetry_path: cli
            .telemetry_path
            .clone()
            .or(profile.telemetry_path)
            .unwrap_or_else(|| ".poetry-agents/telemetry/events.jsonl".to_string()),
        server_host: profile
            .server_host
            .unwrap_or_else(|| DEFAULT_SERVER_HOST.to_string()),
        server_port: profile.server_port.unwrap_or(DEFAULT_SERVER_PORT),
        form: profile.form,
        poem_length: profile.poem_length,
        conversation_length: profile.conversation_length,
        use_emojis: profile.use_emojis,
        critique: profile.critique.unwrap_or(false),
        agent1_provider: profile.agent1_provider,
        agent1_model: profile.agent1_model,
        agent2_provider: profile.agent2_provider,
        agent2_model: profile.agent2_model,
    })
}
