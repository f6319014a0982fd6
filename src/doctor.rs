use anyhow::Result;

use crate::config::RuntimeConfig;
use crate::provider::{HttpSettings, Provider, build_client, env_present};

pub fn api_key_checks() -> Vec<(&'static str, bool)> {
    Provider::ALL
        .iter()
        .map(|provider| {
            let key = provider.api_key_env();
            (key, env_present(key))
        })
        .collect()
}

pub async fn run_doctor(cfg: &RuntimeConfig, check_connections: bool) -> Result<()> {
    println!(
        "Active profile: '{}' (config: {})",
        cfg.profile, cfg.config_path
    );

    println!("Provider environment check:");
    let checks = api_key_checks();
    for (key, ok) in &checks {
        let status = if *ok { "set" } else { "missing" };
        println!("- {key}: {status}");
    }
    if checks.iter().all(|(_, ok)| !ok) {
        println!("Tip: export at least one provider key, e.g. ANTHROPIC_API_KEY");
    }

    println!("Output directory: {}", cfg.output_dir);
    println!("Request timeout: {}s", cfg.request_timeout_secs);
    println!(
        "Server: {}:{}",
        cfg.server_host, cfg.server_port
    );
    println!(
        "Telemetry: enabled={} path={}",
        cfg.telemetry_enabled, cfg.telemetry_path
    );

    if !check_connections {
        return Ok(());
    }

    let settings = HttpSettings::from_runtime(cfg)?;
    println!("Connection checks:");
    for provider in Provider::ALL {
        if !env_present(provider.api_key_env()) {
            println!("- {}: skipped (no key)", provider.label());
            continue;
        }
        match build_client(provider, None, &settings).await {
            Ok(client) => {
                let status = if client.test_connection().await {
                    "ok"
                } else {
                    "failed"
                };
                println!("- {} ({}): {status}", provider.label(), client.model_id());
            }
            Err(err) => println!("- {}: failed ({err})", provider.label()),
        }
    }

    Ok(())
}
