use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use poetry_agents::cli::{
    Cli, Commands, GenerateArgs, ProfileCommands, Provider, TelemetryCommands, command_label,
};
use poetry_agents::config::{RuntimeConfig, load_profiles, resolve_runtime_config};
use poetry_agents::critique::LiveJudgeFactory;
use poetry_agents::dialogue::format_dialogue_output;
use poetry_agents::doctor::run_doctor;
use poetry_agents::error::{categorize_error, format_cli_error};
use poetry_agents::interactive::{Prompter, build_dialogue_config};
use poetry_agents::llm::openrouter;
use poetry_agents::pipeline::generate_and_save;
use poetry_agents::profiles::{run_profiles_list, run_profiles_show};
use poetry_agents::provider::{HttpSettings, list_models};
use poetry_agents::server::run_server;
use poetry_agents::telemetry::{TelemetryEvent, TelemetrySink, run_telemetry_report};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    if let Err(err) = run_cli(cli).await {
        eprintln!("{}", format_cli_error(&err));
        tracing::error!(category = %categorize_error(&err).code(), error = %err, "command failed");
        std::process::exit(1);
    }

    Ok(())
}

async fn run_cli(cli: Cli) -> Result<()> {
    init_tracing(&cli.log_filter)?;
    let profiles = load_profiles(&cli.config_path)?;
    let cfg = resolve_runtime_config(&cli, &profiles)?;
    let telemetry = TelemetrySink::new(&cfg, command_label(&cli.command));
    telemetry.emit(TelemetryEvent::CommandStarted {
        profile: cfg.profile.clone(),
    });

    let outcome = match cli.command {
        Commands::Generate(args) => run_generate(&cfg, &args, &telemetry).await,
        Commands::Models {
            provider,
            limit,
            search,
            status,
        } => match status {
            Some(model_id) => run_model_status(&cfg, provider, &model_id).await,
            None => run_models(&cfg, provider, limit, search).await,
        },
        Commands::Serve { host, port } => {
            let host = host.unwrap_or_else(|| cfg.server_host.clone());
            let port = port.unwrap_or(cfg.server_port);
            run_server(cfg.clone(), host, port, &telemetry).await
        }
        Commands::Doctor { check_connections } => run_doctor(&cfg, check_connections).await,
        Commands::Profiles { command } => match command {
            ProfileCommands::List => run_profiles_list(&profiles, &cfg),
            ProfileCommands::Show => run_profiles_show(&cfg),
        },
        Commands::Telemetry { command } => match command {
            TelemetryCommands::Report { path, limit } => run_telemetry_report(&cfg, path, limit),
        },
    };

    match &outcome {
        Ok(()) => telemetry.emit(TelemetryEvent::CommandCompleted),
        Err(err) => telemetry.emit(TelemetryEvent::CommandFailed {
            category: categorize_error(err).code().to_string(),
            error: err.to_string(),
        }),
    }
    outcome
}

fn init_tracing(log_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_filter).unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing subscriber: {e}"))
}

async fn run_generate(
    cfg: &RuntimeConfig,
    args: &GenerateArgs,
    telemetry: &TelemetrySink,
) -> Result<()> {
    let settings = HttpSettings::from_runtime(cfg)?;
    let interactive = !args.non_interactive && io::stdin().is_terminal();

    let config = if interactive {
        println!("Poetry Agents");
        println!("=============");
        let stdin = io::stdin();
        let mut prompter = Prompter::new(stdin.lock(), io::stdout());
        build_dialogue_config(args, cfg, &settings, Some(&mut prompter)).await?
    } else {
        build_dialogue_config::<io::StdinLock<'static>, io::Stdout>(args, cfg, &settings, None)
            .await?
    };

    println!(
        "\nGenerating a {} dialogue about '{}' ({} round(s))...",
        config.form.as_str(),
        config.theme,
        config.conversation_length
    );
    let (result, path) = generate_and_save(
        &config,
        &settings,
        Arc::new(LiveJudgeFactory::new(settings.clone())),
        &PathBuf::from(&cfg.output_dir),
        args.output.as_deref(),
        telemetry,
    )
    .await?;

    println!("\n{}", format_dialogue_output(&result));
    if let Some(critique) = &result.critique {
        println!(
            "Judge: {} ({})\n\n{}\n",
            critique.judge_provider, critique.judge_model, critique.critique_text
        );
    }
    println!("Saved dialogue to {}", path.display());
    Ok(())
}

async fn run_model_status(cfg: &RuntimeConfig, provider: Provider, model_id: &str) -> Result<()> {
    if provider != Provider::Openrouter {
        anyhow::bail!("--status is only supported for the openrouter provider");
    }
    let endpoint = HttpSettings::from_runtime(cfg)?.endpoint(Provider::Openrouter)?;
    let status = openrouter::check_model_status(&endpoint, model_id).await;
    if let Some(error) = &status.error {
        anyhow::bail!("{error}");
    }
    println!("{model_id}: available");
    if let Some(context_length) = status.context_length {
        println!("Context length: {context_length}");
    }
    if let Some(pricing) = &status.pricing {
        println!("Pricing: {pricing}");
    }
    for warning in &status.warnings {
        println!("Warning: {warning}");
    }
    if status.is_free_model {
        println!("Paid alternatives: {}", openrouter::paid_alternatives(model_id).join(", "));
    }
    Ok(())
}

async fn run_models(
    cfg: &RuntimeConfig,
    provider: Provider,
    limit: Option<usize>,
    search: Option<String>,
) -> Result<()> {
    let settings = HttpSettings::from_runtime(cfg)?;

    if let Some(term) = search.filter(|term| !term.trim().is_empty()) {
        if provider != Provider::Openrouter {
            anyhow::bail!("--search is only supported for the openrouter provider");
        }
        let endpoint = settings.endpoint(Provider::Openrouter)?;
        let models = openrouter::search_models(&endpoint, &term).await?;
        println!("OpenRouter models matching '{term}':");
        for model in models.iter().take(limit.unwrap_or(usize::MAX)) {
            let price = if model.is_free() { " [free]" } else { "" };
            println!("- {} ({}){price}", model.display_name(), model.id);
        }
        return Ok(());
    }

    let catalog = list_models(provider, &settings, limit).await?;
    println!("{} models:", provider.label());
    for (idx, entry) in catalog.iter().enumerate() {
        println!("{}. {} ({})", idx + 1, entry.name, entry.id);
    }
    Ok(())
}
