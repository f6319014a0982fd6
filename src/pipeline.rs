use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;

use crate::cli::{form_slug, provider_slug};
use crate::config::DialogueConfig;
use crate::critique::{AgentModel, CritiqueService, JudgeFactory};
use crate::dialogue::{DialogueManager, DialogueResult};
use crate::llm::LlmClient;
use crate::markdown::save_dialogue_to_markdown;
use crate::provider::ClientFactory;
use crate::telemetry::{TelemetryEvent, TelemetrySink};

pub async fn build_agent_clients(
    config: &DialogueConfig,
    factory: &dyn ClientFactory,
) -> Result<Vec<Arc<dyn LlmClient>>> {
    let mut clients = Vec::with_capacity(config.agents.len());
    for agent in &config.agents {
        clients.push(factory.build(agent.provider, agent.model.as_deref()).await?);
    }
    Ok(clients)
}

/// Builds the agents, runs the dialogue and, when asked, the judge pass.
pub async fn run_dialogue(
    config: &DialogueConfig,
    factory: &dyn ClientFactory,
    judges: Arc<dyn JudgeFactory>,
    telemetry: &TelemetrySink,
) -> Result<DialogueResult> {
    config.validate()?;
    let started_at = Instant::now();
    let clients = build_agent_clients(config, factory).await?;
    let agent_models = clients
        .iter()
        .map(|client| AgentModel::from_client(client.as_ref()))
        .collect::<Vec<_>>();

    let result = DialogueManager::new(clients)
        .generate_dialogue(config)
        .await?;
    for turn in &result.conversation {
        telemetry.emit(TelemetryEvent::DialogueTurn {
            round: turn.round,
            agent_index: turn.agent_index,
            llm_used: turn.llm_used.clone(),
        });
    }
    telemetry.emit(TelemetryEvent::DialogueCompleted {
        form: form_slug(config.form).to_string(),
        turns: result.conversation.len(),
        providers: config
            .agents
            .iter()
            .map(|agent| provider_slug(agent.provider).to_string())
            .collect(),
        latency_ms: started_at.elapsed().as_millis() as u64,
    });

    if !config.use_critique {
        return Ok(result);
    }

    let improved = CritiqueService::new(judges)
        .critique_and_improve(&agent_models, &result)
        .await;
    if let Some(critique) = &improved.critique {
        let judge_provider = critique.judge_provider.clone();
        let judge_model = critique.judge_model.clone();
        telemetry.emit(if judge_provider == "Error" {
            TelemetryEvent::CritiqueFailed {
                judge_provider,
                judge_model,
            }
        } else {
            TelemetryEvent::CritiqueCompleted {
                judge_provider,
                judge_model,
            }
        });
    }
    Ok(improved)
}

pub async fn generate_and_save(
    config: &DialogueConfig,
    factory: &dyn ClientFactory,
    judges: Arc<dyn JudgeFactory>,
    output_dir: &Path,
    filename: Option<&str>,
    telemetry: &TelemetrySink,
) -> Result<(DialogueResult, PathBuf)> {
    let result = run_dialogue(config, factory, judges, telemetry).await?;
    let path = save_dialogue_to_markdown(&result, output_dir, filename)?;
    Ok((result, path))
}
