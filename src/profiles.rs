use anyhow::Result;

use crate::cli::{form_slug, provider_slug};
use crate::config::{ProfilesFile, RuntimeConfig};

pub fn run_profiles_list(profiles: &ProfilesFile, cfg: &RuntimeConfig) -> Result<()> {
    let mut names = profiles.profiles.keys().cloned().collect::<Vec<String>>();
    if !names.iter().any(|name| name == "default") {
        names.push("default".to_string());
    }
    names.sort();

    println!("Configured profiles (active='{}'):", cfg.profile);
    for name in names {
        let marker = if name == cfg.profile { "*" } else { " " };
        let source = if profiles.profiles.contains_key(&name) {
            "configured"
        } else {
            "implicit"
        };
        println!("{marker} {name} ({source})");
    }

    Ok(())
}

fn or_default<T: ToString>(value: Option<T>) -> String {
    value
        .map(|value| value.to_string())
        .unwrap_or_else(|| "<default>".to_string())
}

pub fn run_profiles_show(cfg: &RuntimeConfig) -> Result<()> {
    println!("Active profile: {}", cfg.profile);
    println!("Config path: {}", cfg.config_path);
    println!("Form: {}", or_default(cfg.form.map(form_slug)));
    println!("Poem length: {}", or_default(cfg.poem_length));
    println!("Rounds: {}", or_default(cfg.conversation_length));
    println!("Emojis: {}", or_default(cfg.use_emojis));
    println!("Critique: {}", cfg.critique);
    println!(
        "Agent 1: {} {}",
        or_default(cfg.agent1_provider.map(provider_slug)),
        cfg.agent1_model.as_deref().unwrap_or("<provider-default>")
    );
    println!(
        "Agent 2: {} {}",
        or_default(cfg.agent2_provider.map(provider_slug)),
        cfg.agent2_model.as_deref().unwrap_or("<provider-default>")
    );
    println!("Output dir: {}", cfg.output_dir);
    println!("Request timeout (secs): {}", cfg.request_timeout_secs);
    println!("Server: {}:{}", cfg.server_host, cfg.server_port);
    println!("Telemetry enabled: {}", cfg.telemetry_enabled);
    println!("Telemetry path: {}", cfg.telemetry_path);
    Ok(())
}
