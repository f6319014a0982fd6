//! Judge/editor pass over a finished dialogue.
//!
//! The judge comes from a vendor none of the agents used. It critiques the
//! dialogue, rewrites it, and the rewrite is split back into turns on its
//! `**Name:**` markers. A rewrite whose turn count does not match the original
//! is discarded and the original conversation kept.

use std::collections::HashSet;
use std::sync::{Arc, LazyLock};

use anyhow::Result;
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::DialogueConfig;
use crate::dialogue::{ConversationTurn, DialogueResult};
use crate::error::PoetryError;
use crate::llm::openrouter;
use crate::llm::{LlmClient, ModelCatalog};
use crate::provider::{Company, HttpSettings, JUDGE_PRIORITY, Provider, build_client, list_models};
use crate::rules::turner::{avoid_list, critique_rules, editing_rules, enhance_list};

const CRITIQUE_MAX_TOKENS: u32 = 800;
const EDIT_MAX_TOKENS: u32 = 1200;

pub(crate) static SPEAKER_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\n\*\*([^*]+):\*\*\n").expect("SPEAKER_MARKER regex should compile")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Critique {
    pub judge_provider: String,
    pub judge_model: String,
    pub critique_text: String,
    pub edited_conversation: Vec<ConversationTurn>,
}

/// The model one agent actually ran on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentModel {
    pub provider: Provider,
    pub model_id: String,
    pub model_name: String,
}

impl AgentModel {
    pub fn from_client(client: &dyn LlmClient) -> Self {
        Self {
            provider: client.provider(),
            model_id: client.model_id().to_string(),
            model_name: client.model_name().to_string(),
        }
    }

    pub fn company(&self) -> Option<Company> {
        self.provider
            .company()
            .or_else(|| Company::from_openrouter_model(&self.model_id))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JudgeSelection {
    /// "Google", "Anthropic", "OpenAI", or "OpenRouter".
    pub provider_label: String,
    pub provider: Provider,
    pub company: Option<Company>,
    /// `None` lets the factory pick the provider default.
    pub model: Option<String>,
}

#[async_trait]
pub trait JudgeFactory: Send + Sync {
    /// Newest-first catalog of a vendor's direct models.
    async fn company_models(&self, company: Company) -> Result<ModelCatalog>;

    /// OpenRouter model ids matching a search term, most relevant first.
    async fn openrouter_candidates(&self, term: &str) -> Result<Vec<String>>;

    async fn build(&self, selection: &JudgeSelection) -> Result<Arc<dyn LlmClient>>;
}

/// Builds judges against the real vendor APIs.
pub struct LiveJudgeFactory {
    settings: HttpSettings,
}

impl LiveJudgeFactory {
    pub fn new(settings: HttpSettings) -> Self {
        Self { settings }
    }
}

#[async_trait]
impl JudgeFactory for LiveJudgeFactory {
    async fn company_models(&self, company: Company) -> Result<ModelCatalog> {
        list_models(company.direct_provider(), &self.settings, None).await
    }

    async fn openrouter_candidates(&self, term: &str) -> Result<Vec<String>> {
        let endpoint = self.settings.endpoint(Provider::Openrouter)?;
        let models = openrouter::search_models(&endpoint, term).await?;
        Ok(models.into_iter().map(|model| model.id).collect())
    }

    async fn build(&self, selection: &JudgeSelection) -> Result<Arc<dyn LlmClient>> {
        build_client(selection.provider, selection.model.as_deref(), &self.settings).await
    }
}

fn used_model_names(agents: &[AgentModel]) -> HashSet<&str> {
    agents
        .iter()
        .flat_map(|agent| [agent.model_id.as_str(), agent.model_name.as_str()])
        .collect()
}

pub async fn select_judge(
    config: &DialogueConfig,
    agents: &[AgentModel],
    factory: &dyn JudgeFactory,
) -> Result<JudgeSelection> {
    let used_companies = agents
        .iter()
        .filter_map(AgentModel::company)
        .collect::<HashSet<Company>>();
    let used_models = used_model_names(agents);

    if config.use_openrouter {
        for company in JUDGE_PRIORITY {
            if used_companies.contains(&company) {
                continue;
            }
            for term in company.openrouter_search_terms() {
                let candidates = match factory.openrouter_candidates(term).await {
                    Ok(candidates) => candidates,
                    Err(err) => {
                        tracing::warn!(term = *term, error = %err, "judge model search failed");
                        continue;
                    }
                };
                if let Some(model_id) = candidates
                    .into_iter()
                    .find(|id| !used_models.contains(id.as_str()))
                {
                    return Ok(JudgeSelection {
                        provider_label: Provider::Openrouter.label().to_string(),
                        provider: Provider::Openrouter,
                        company: Some(company),
                        model: Some(model_id),
                    });
                }
            }
        }
        return Ok(JudgeSelection {
            provider_label: Provider::Openrouter.label().to_string(),
            provider: Provider::Openrouter,
            company: None,
            model: None,
        });
    }

    let company = JUDGE_PRIORITY
        .into_iter()
        .find(|company| !used_companies.contains(company))
        .ok_or_else(|| {
            PoetryError::Configuration(
                "Cannot select judge-editor: all companies are already used in conversation"
                    .to_string(),
            )
        })?;

    let catalog = factory.company_models(company).await?;
    let model = catalog
        .iter()
        .find(|entry| {
            !used_models.contains(entry.name.as_str()) && !used_models.contains(entry.id.as_str())
        })
        .or_else(|| catalog.first())
        .map(|entry| entry.id.clone());

    Ok(JudgeSelection {
        provider_label: company.label().to_string(),
        provider: company.direct_provider(),
        company: Some(company),
        model,
    })
}

fn conversation_text(conversation: &[ConversationTurn]) -> String {
    conversation
        .iter()
        .map(|turn| format!("**{}:**\n{}\n\n", turn.agent, turn.poetry))
        .collect()
}

fn bullet_list(items: &[&str]) -> String {
    items
        .iter()
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn critique_prompt(result: &DialogueResult) -> String {
    let theme = &result.config.theme;
    let form = result.config.form.as_str();
    format!(
        r#"You are an expert poetry critic and literary scholar specializing in Fred Turner's comprehensive approach to poetry evaluation. Please provide a detailed critique of this poetry conversation between {count} poets.

**CONVERSATION DETAILS:**
- Theme: {theme}
- Poetic Form: {form}
- Participants: {participants}

**CONVERSATION TO CRITIQUE:**
{conversation}

**TURNER-BASED CRITIQUE FRAMEWORK:**
Apply these comprehensive evaluation criteria based on Fred Turner's poetry guidelines:

{rules}

**SPECIFIC ISSUES TO IDENTIFY:**
Look for these common problems:
{avoid}

**CRITIQUE INSTRUCTIONS:**
Analyze this poetry conversation and provide constructive feedback on:

1. **Thematic Coherence**: How well does the conversation stay true to the theme of "{theme}"? Does it maintain thematic consistency throughout?

2. **Poetic Form Adherence**: How well do the poems follow the {form} form requirements? Check structural rules, meter, and formal constraints.

3. **Literary Quality & Craft**:
   - Assess imagery (concrete vs abstract, sensory richness)
   - Evaluate metaphors, similes, and literary devices
   - Analyze word choice and language accessibility
   - Check for archaic language or forced inversions

4. **Emotional Complexity**:
   - Does the poetry use mixed emotions (positive + negative)?
   - Is there emotional depth and sophistication?
   - Are emotions one-dimensional or complex?

5. **Technical Execution**:
   - Natural scansion and rhythm
   - Appropriate use of rhyme (if any)
   - Flow and readability
   - Effectiveness of endings

6. **Conversational Flow**: How well do the poems respond to and build upon each other?

7. **Character Voice**: Does each poet have a distinct voice and perspective?

8. **Originality**: Are there clichés or overused expressions that should be avoided?

**FORMAT YOUR CRITIQUE:**
Provide a structured critique with clear sections for each area above. Be specific about what works well and what could be improved according to Turner's guidelines. Suggest concrete improvements where possible.

Your critique:"#,
        count = result.agents.len(),
        participants = result.agents.join(", "),
        conversation = conversation_text(&result.conversation),
        rules = critique_rules(),
        avoid = bullet_list(avoid_list()),
    )
}

/// The format template lists one marker per turn, alternating agents.
fn edit_format_template(result: &DialogueResult) -> String {
    if result.agents.is_empty() {
        return String::new();
    }
    let turns = result.conversation.len().max(result.agents.len());
    (0..turns)
        .map(|idx| {
            format!(
                "**{}:**\n[improved poem following Turner guidelines]",
                result.agents[idx % result.agents.len()]
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub fn edit_prompt(result: &DialogueResult, critique: &str) -> String {
    let theme = &result.config.theme;
    let form = result.config.form.as_str();
    format!(
        r#"Based on your critique, please improve this poetry conversation using Fred Turner's comprehensive poetry improvement guidelines. Keep the same structure and participants, but enhance the poems according to both your critique and Turner's standards.

**ORIGINAL CONVERSATION:**
{conversation}

**YOUR CRITIQUE:**
{critique}

**TURNER-BASED IMPROVEMENT GUIDELINES:**
Apply these specific improvement strategies:

{rules}

**ENHANCEMENT PRIORITIES:**
Focus on strengthening these elements:
{enhance}

**ELEMENTS TO AVOID/CORRECT:**
Eliminate or improve these issues:
{avoid}

**EDITING INSTRUCTIONS:**
1. **Preserve Structure**: Maintain the same theme ({theme}), poetic form ({form}), and participants ({participants})
2. **Keep Organization**: Same number of poems in the same order
3. **Apply Turner Standards**: Use the improvement guidelines above systematically
4. **Enhance Emotional Complexity**: Add mixed emotions (positive + negative) for depth
5. **Improve Imagery**: Replace abstract language with concrete, sensory-rich descriptions
6. **Fix Technical Issues**: Correct scansion, remove forced inversions, strengthen endings
7. **Eliminate Problems**: Remove archaic language, clichés, and awkward phrasing
8. **Maintain Voice**: Preserve distinct character voices while improving quality
9. **Strengthen Coherence**: Enhance thematic connections and conversational flow
10. **Form Compliance**: Ensure strict adherence to {form} requirements

**SPECIFIC FORM GUIDANCE for {form_upper}:**
- Follow all structural rules precisely
- Pay special attention to meter and rhythm patterns
- Ensure endings are both formally correct and emotionally resonant

**FORMAT YOUR EDITED CONVERSATION:**
Present the improved conversation using this exact format:

{template}

Continue this pattern for all poems in the original conversation.

Your edited conversation:"#,
        conversation = conversation_text(&result.conversation),
        rules = editing_rules(),
        enhance = bullet_list(enhance_list()),
        avoid = bullet_list(avoid_list()),
        participants = result.agents.join(", "),
        form_upper = form.to_uppercase(),
        template = edit_format_template(result),
    )
}

/// Splits the judge's rewrite back into turns. Each parsed section takes the
/// metadata of the next unclaimed original turn by the same agent; when the
/// counts disagree the original conversation comes back unchanged.
pub fn parse_edited_conversation(
    edited_text: &str,
    original: &[ConversationTurn],
) -> Vec<ConversationTurn> {
    let marker = &*SPEAKER_MARKER;
    // A leading newline lets a marker on the very first line split like the rest.
    let text = format!("\n{}", edited_text.trim_start());

    let mut sections = Vec::new();
    for caps in marker.captures_iter(&text) {
        if let (Some(whole), Some(name)) = (caps.get(0), caps.get(1)) {
            sections.push((name.as_str().trim().to_string(), whole.start(), whole.end()));
        }
    }

    let mut claimed = vec![false; original.len()];
    let mut parsed = Vec::with_capacity(sections.len());
    for (idx, (name, _, body_start)) in sections.iter().enumerate() {
        let body_end = sections
            .get(idx + 1)
            .map(|(_, next_start, _)| *next_start)
            .unwrap_or(text.len());
        let poetry = text[*body_start..body_end].trim().to_string();

        let slot = original
            .iter()
            .enumerate()
            .position(|(pos, turn)| !claimed[pos] && turn.agent == *name);
        if let Some(pos) = slot {
            claimed[pos] = true;
            let mut turn = original[pos].clone();
            turn.poetry = poetry;
            parsed.push(turn);
        }
    }

    if parsed.len() != original.len() {
        tracing::warn!(
            parsed = parsed.len(),
            expected = original.len(),
            "could not parse edited conversation, keeping original"
        );
        return original.to_vec();
    }
    parsed
}

pub struct CritiqueService {
    factory: Arc<dyn JudgeFactory>,
}

impl CritiqueService {
    pub fn new(factory: Arc<dyn JudgeFactory>) -> Self {
        Self { factory }
    }

    pub fn live(settings: HttpSettings) -> Self {
        Self::new(Arc::new(LiveJudgeFactory::new(settings)))
    }

    pub async fn generate_critique(&self, judge: &dyn LlmClient, result: &DialogueResult) -> String {
        match judge
            .generate(&critique_prompt(result), CRITIQUE_MAX_TOKENS)
            .await
        {
            Ok(text) => text.trim().to_string(),
            Err(err) => format!("Error generating critique: {err}"),
        }
    }

    pub async fn edit_conversation(
        &self,
        judge: &dyn LlmClient,
        result: &DialogueResult,
        critique: &str,
    ) -> Vec<ConversationTurn> {
        match judge
            .generate(&edit_prompt(result, critique), EDIT_MAX_TOKENS)
            .await
        {
            Ok(text) => parse_edited_conversation(text.trim(), &result.conversation),
            Err(err) => {
                tracing::warn!(error = %err, "conversation edit failed, keeping original");
                result.conversation.clone()
            }
        }
    }

    async fn run(&self, agents: &[AgentModel], result: &DialogueResult) -> Result<Critique> {
        let selection = select_judge(&result.config, agents, self.factory.as_ref()).await?;
        let judge = self.factory.build(&selection).await?;
        tracing::info!(
            judge = %selection.provider_label,
            model = judge.model_id(),
            "judge selected"
        );

        let critique_text = self.generate_critique(judge.as_ref(), result).await;
        let edited_conversation = self
            .edit_conversation(judge.as_ref(), result, &critique_text)
            .await;
        Ok(Critique {
            judge_provider: selection.provider_label,
            judge_model: judge.model_name().to_string(),
            critique_text,
            edited_conversation,
        })
    }

    /// Attaches a critique to a copy of `result`. Judge selection or
    /// construction failures are recorded in the critique rather than returned.
    pub async fn critique_and_improve(
        &self,
        agents: &[AgentModel],
        result: &DialogueResult,
    ) -> DialogueResult {
        let critique = match self.run(agents, result).await {
            Ok(critique) => critique,
            Err(err) => {
                tracing::warn!(error = %err, "critique process failed");
                Critique {
                    judge_provider: "Error".to_string(),
                    judge_model: "N/A".to_string(),
                    critique_text: format!("Error generating critique: {err}"),
                    edited_conversation: result.conversation.clone(),
                }
            }
        };
        let mut improved = result.clone();
        improved.critique = Some(critique);
        improved
    }
}
