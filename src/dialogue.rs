/// Poetry dialogue orchestration.
///
/// A dialogue is `conversation_length` rounds of every agent writing once, in
/// agent order. The first turn of round 1 is written from the theme alone;
/// every later turn answers the transcript so far. Any failed turn aborts the
/// whole generation.
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::config::DialogueConfig;
use crate::critique::Critique;
use crate::enhancement::EnhancementService;
use crate::error::PoetryError;
use crate::llm::LlmClient;
use crate::personas::get_random_names;
use crate::prompts::{
    conversation_context, initial_poetry_prompt, response_poetry_prompt, title_prompt, turn_prompt,
};
use crate::provider::client_display_name;

const TITLE_MAX_TOKENS: u32 = 20;
const TURN_MAX_TOKENS: u32 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub agent: String,
    pub poetry: String,
    /// 1-based.
    pub round: u32,
    pub agent_index: usize,
    pub llm_used: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialogueResult {
    pub title: String,
    pub ascii_art: String,
    pub agents: Vec<String>,
    pub conversation: Vec<ConversationTurn>,
    pub config: DialogueConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub critique: Option<Critique>,
}

pub struct DialogueManager {
    clients: Vec<Arc<dyn LlmClient>>,
    agent_names: Option<Vec<String>>,
}

impl DialogueManager {
    /// One client per agent, in agent order. The first client also writes the
    /// title, the ASCII art and the emoji pass.
    pub fn new(clients: Vec<Arc<dyn LlmClient>>) -> Self {
        Self {
            clients,
            agent_names: None,
        }
    }

    /// Fixes the persona names instead of drawing them at random.
    pub fn with_agent_names(mut self, names: Vec<String>) -> Self {
        self.agent_names = Some(names);
        self
    }

    pub fn clients(&self) -> &[Arc<dyn LlmClient>] {
        &self.clients
    }

    pub async fn generate_dialogue(&self, config: &DialogueConfig) -> Result<DialogueResult> {
        config.validate()?;
        let num_agents = config.num_agents as usize;
        if self.clients.len() < num_agents {
            return Err(PoetryError::Configuration(format!(
                "{} agents configured but only {} clients available",
                num_agents,
                self.clients.len()
            ))
            .into());
        }
        let lead = self.clients[0].clone();

        let title = lead
            .generate(&title_prompt(&config.theme), TITLE_MAX_TOKENS)
            .await
            .context("title generation failed")?;
        let title = clean_title(&title);

        let agents = match &self.agent_names {
            Some(names) => names.iter().take(num_agents).cloned().collect::<Vec<_>>(),
            None => get_random_names(num_agents),
        };
        if agents.len() < num_agents {
            return Err(PoetryError::Configuration(format!(
                "not enough persona names for {num_agents} agents"
            ))
            .into());
        }

        let enhancer = EnhancementService::new(lead);
        let ascii_art = enhancer.generate_ascii_art(&config.theme).await;

        let mut conversation: Vec<ConversationTurn> = Vec::new();
        for round in 1..=config.conversation_length {
            for (agent_index, agent) in agents.iter().enumerate() {
                let task = if conversation.is_empty() {
                    initial_poetry_prompt(
                        &config.theme,
                        config.form,
                        config.poem_length,
                        config.length_unit,
                    )
                } else {
                    let context = conversation_context(&config.theme, &conversation);
                    response_poetry_prompt(
                        agent,
                        &context,
                        config.form,
                        config.poem_length,
                        config.length_unit,
                    )
                };
                let prompt = turn_prompt(agent, config.form, &task);

                let client = &self.clients[agent_index];
                let mut poetry = client.generate(&prompt, TURN_MAX_TOKENS).await?;
                if config.use_emojis {
                    poetry = enhancer.add_emojis(&poetry, &config.theme).await;
                }

                tracing::info!(
                    round,
                    agent = %agent,
                    provider = client.provider().label(),
                    model = client.model_id(),
                    "turn generated"
                );
                conversation.push(ConversationTurn {
                    agent: agent.clone(),
                    poetry,
                    round,
                    agent_index,
                    llm_used: client_display_name(client.provider(), client.model_name()),
                });
            }
        }

        Ok(DialogueResult {
            title,
            ascii_art,
            agents,
            conversation,
            config: config.clone(),
            critique: None,
        })
    }
}

fn clean_title(raw: &str) -> String {
    raw.trim().trim_matches(|ch| ch == '"' || ch == '\'').trim().to_string()
}

/// Plain rendering for the terminal: title, then each agent's non-blank lines.
pub fn format_dialogue_output(result: &DialogueResult) -> String {
    let mut output = vec![format!("# {}", result.title), String::new()];
    for turn in &result.conversation {
        output.push(format!("**{}:**", turn.agent));
        output.push(String::new());
        output.extend(
            turn.poetry
                .lines()
                .filter(|line| !line.trim().is_empty())
                .map(str::to_string),
        );
        output.push(String::new());
    }
    output.join("\n")
}
