use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[value(alias = "anthropic")]
    #[serde(alias = "anthropic")]
    Claude,
    #[value(alias = "google")]
    #[serde(alias = "google")]
    Gemini,
    Openai,
    Openrouter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PoetryForm {
    Haiku,
    Prose,
    Sonnet,
    Villanelle,
    Limerick,
    Ballad,
    Ghazal,
    Tanka,
}

#[derive(Debug, Subcommand)]
pub enum ProfileCommands {
    #[command(about = "List configured profiles and highlight the active profile")]
    List,
    #[command(about = "Show the active profile's resolved runtime settings")]
    Show,
}

#[derive(Debug, Subcommand)]
pub enum TelemetryCommands {
    #[command(about = "Summarize telemetry events from a JSONL stream")]
    Report {
        #[arg(long)]
        path: Option<String>,
        #[arg(long, default_value_t = 5000)]
        limit: usize,
    },
}

#[derive(Debug, Clone, Default, Args)]
pub struct GenerateArgs {
    #[arg(long)]
    pub theme: Option<String>,

    #[arg(long, value_enum)]
    pub form: Option<PoetryForm>,

    /// Lines, stanzas, couplets, or paragraphs depending on the form. Ignored for fixed forms.
    #[arg(long)]
    pub length: Option<u32>,

    /// Rounds of conversation; each agent writes one poem per round.
    #[arg(long)]
    pub rounds: Option<u32>,

    #[arg(long, action = clap::ArgAction::Set)]
    pub emojis: Option<bool>,

    /// Ask a judge model from an unused company to critique and edit the dialogue.
    #[arg(long, action = clap::ArgAction::Set)]
    pub critique: Option<bool>,

    /// Route both agents through OpenRouter; models are then OpenRouter ids or search terms.
    #[arg(long, default_value_t = false)]
    pub openrouter: bool,

    #[arg(long, value_enum)]
    pub agent1_provider: Option<Provider>,

    #[arg(long)]
    pub agent1_model: Option<String>,

    #[arg(long, value_enum)]
    pub agent2_provider: Option<Provider>,

    #[arg(long)]
    pub agent2_model: Option<String>,

    /// Write to this path instead of outputs/poetry_dialogue_<timestamp>.md.
    #[arg(long)]
    pub output: Option<String>,

    /// Fail instead of prompting when a required answer is missing.
    #[arg(long, default_value_t = false)]
    pub non_interactive: bool,
}

const CLI_EXAMPLES: &str = "Examples:\n\
  poetry-agents generate\n\
  poetry-agents generate --theme \"a walk in the snow\" --form haiku --rounds 2 \\\n\
      --agent1-provider claude --agent2-provider gemini --non-interactive\n\
  poetry-agents generate --openrouter --agent1-model anthropic/claude-3.5-sonnet \\\n\
      --agent2-model openai/gpt-4o --theme \"tides\" --form ghazal --length 5 --critique true\n\
  poetry-agents models claude\n\
  poetry-agents models openrouter --search llama\n\
  poetry-agents serve --port 8080\n\
  poetry-agents doctor --check-connections\n\
  poetry-agents --profile sonnets profiles show\n\
  poetry-agents telemetry report --limit 2000\n\
\n\
Provider keys:\n\
  ANTHROPIC_API_KEY, GEMINI_API_KEY, OPENAI_API_KEY, OPENROUTER_API_KEY";

#[derive(Debug, Parser)]
#[command(name = "poetry-agents")]
#[command(about = "Poetry dialogues between literary personas, written by LLMs")]
#[command(after_long_help = CLI_EXAMPLES)]
pub struct Cli {
    #[arg(long, env = "POETRY_AGENTS_PROFILE", default_value = "default")]
    pub profile: String,

    #[arg(
        long,
        env = "POETRY_AGENTS_CONFIG",
        default_value = ".poetry-agents/config.toml"
    )]
    pub config_path: String,

    #[arg(long, env = "POETRY_AGENTS_OUTPUT_DIR")]
    pub output_dir: Option<String>,

    #[arg(long, env = "POETRY_AGENTS_REQUEST_TIMEOUT_SECS")]
    pub request_timeout_secs: Option<u64>,

    #[arg(long, env = "POETRY_AGENTS_TELEMETRY_ENABLED", action = clap::ArgAction::Set)]
    pub telemetry_enabled: Option<bool>,

    #[arg(long, env = "POETRY_AGENTS_TELEMETRY_PATH")]
    pub telemetry_path: Option<String>,

    #[arg(long, env = "RUST_LOG", default_value = "error")]
    pub log_filter: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    #[command(about = "Generate a poetry dialogue and save it as markdown")]
    Generate(GenerateArgs),
    #[command(about = "List available models for a provider")]
    Models {
        #[arg(value_enum)]
        provider: Provider,
        #[arg(long)]
        limit: Option<usize>,
        /// OpenRouter only: rank models matching this term.
        #[arg(long)]
        search: Option<String>,
        /// OpenRouter only: report availability and pricing for one model id.
        #[arg(long, value_name = "MODEL_ID", conflicts_with = "search")]
        status: Option<String>,
    },
    #[command(about = "Run the web interface and JSON API")]
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    #[command(about = "Check provider keys and optionally test each connection")]
    Doctor {
        #[arg(long, default_value_t = false)]
        check_connections: bool,
    },
    #[command(about = "Inspect profile configuration and active resolved profile state")]
    Profiles {
        #[command(subcommand)]
        command: ProfileCommands,
    },
    #[command(about = "Telemetry utilities and reporting")]
    Telemetry {
        #[command(subcommand)]
        command: TelemetryCommands,
    },
}

pub fn command_label(command: &Commands) -> String {
    match command {
        Commands::Generate(_) => "generate".to_string(),
        Commands::Models { provider, .. } => {
            format!("models.{}", provider_slug(*provider))
        }
        Commands::Serve { .. } => "serve".to_string(),
        Commands::Doctor { .. } => "doctor".to_string(),
        Commands::Profiles { command } => match command {
            ProfileCommands::List => "profiles.list".to_string(),
            ProfileCommands::Show => "profiles.show".to_string(),
        },
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { .. } => "telemetry.report".to_string(),
        },
    }
}

pub fn provider_slug(provider: Provider) -> &'static str {
    match provider {
        Provider::Claude => "claude",
        Provider::Gemini => "gemini",
        Provider::Openai => "openai",
        Provider::Openrouter => "openrouter",
    }
}

pub fn form_slug(form: PoetryForm) -> &'static str {
    match form {
        PoetryForm::Haiku => "haiku",
        PoetryForm::Prose => "prose",
        PoetryForm::Sonnet => "sonnet",
        PoetryForm::Villanelle => "villanelle",
        PoetryForm::Limerick => "limerick",
        PoetryForm::Ballad => "ballad",
        PoetryForm::Ghazal => "ghazal",
        PoetryForm::Tanka => "tanka",
    }
}
