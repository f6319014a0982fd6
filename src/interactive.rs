/// Question/answer flow behind `generate`.
///
/// Flags and profile values answer questions up front; whatever is still
/// missing is asked on the terminal, or filled from defaults when prompting
/// is disabled.
use std::io::{BufRead, Write};

use anyhow::{Context, Result};

use crate::cli::{GenerateArgs, PoetryForm};
use crate::config::{
    AgentChoice, DialogueConfig, LengthUnit, RuntimeConfig, parse_form, resolve_poem_length,
};
use crate::error::PoetryError;
use crate::provider::{ClientFactory, DEFAULT_OPENROUTER_SEARCH, Provider};

const DIRECT_PROVIDERS: [Provider; 3] = [Provider::Claude, Provider::Gemini, Provider::Openai];
const OPENROUTER_SEARCH_RESULTS: usize = 15;

pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// `None` once input is exhausted.
    pub fn ask(&mut self, question: &str) -> Result<Option<String>> {
        write!(self.output, "{question} ").context("failed to write prompt")?;
        self.output.flush().context("failed to flush prompt")?;
        let mut line = String::new();
        let read = self
            .input
            .read_line(&mut line)
            .context("failed to read answer")?;
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    pub fn say(&mut self, text: &str) -> Result<()> {
        writeln!(self.output, "{text}").context("failed to write output")
    }

    fn ask_required(&mut self, question: &str, what: &str) -> Result<String> {
        loop {
            match self.ask(question)? {
                None => {
                    return Err(PoetryError::Validation(format!(
                        "input ended before {what} was provided"
                    ))
                    .into());
                }
                Some(answer) if answer.is_empty() => self.say(&format!("Please enter {what}."))?,
                Some(answer) => return Ok(answer),
            }
        }
    }

    /// Numbered menu; returns the zero-based index of the chosen option.
    pub fn choose(&mut self, title: &str, options: &[String], default: usize) -> Result<usize> {
        self.say(title)?;
        for (idx, option) in options.iter().enumerate() {
            self.say(&format!("{}. {}", idx + 1, option))?;
        }
        loop {
            let Some(answer) = self.ask(&format!("Choose 1-{} [{}]:", options.len(), default + 1))?
            else {
                return Ok(default);
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match resolve_picker_selection(options, &answer) {
                Some(idx) => return Ok(idx),
                None => self.say(&format!(
                    "Invalid selection '{}'; expected 1-{}.",
                    answer,
                    options.len()
                ))?,
            }
        }
    }

    pub fn ask_number(&mut self, question: &str, default: u32) -> Result<u32> {
        loop {
            let Some(answer) = self.ask(&format!("{question} [{default}]:"))? else {
                return Ok(default);
            };
            if answer.is_empty() {
                return Ok(default);
            }
            match answer.parse::<u32>() {
                Ok(value) if value >= 1 => return Ok(value),
                _ => self.say("Please enter a whole number of at least 1.")?,
            }
        }
    }

    pub fn ask_yes_no(&mut self, question: &str, default: bool) -> Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        loop {
            let Some(answer) = self.ask(&format!("{question} [{hint}]:"))? else {
                return Ok(default);
            };
            match answer.to_ascii_lowercase().as_str() {
                "" => return Ok(default),
                "y" | "yes" => return Ok(true),
                "n" | "no" => return Ok(false),
                _ => self.say("Please answer y or n.")?,
            }
        }
    }
}

/// Accepts a 1-based number or an option's text (case-insensitive).
pub fn resolve_picker_selection(options: &[String], selection: &str) -> Option<usize> {
    let trimmed = selection.trim();
    if let Ok(index) = trimmed.parse::<usize>() {
        return (1..=options.len()).contains(&index).then(|| index - 1);
    }
    options
        .iter()
        .position(|option| option.eq_ignore_ascii_case(trimmed))
}

pub fn length_question(form: PoetryForm) -> Option<&'static str> {
    match form.length_unit() {
        _ if form.fixed_length().is_some() => None,
        LengthUnit::Stanzas => Some("How many stanzas should each poem have?"),
        LengthUnit::Couplets => Some("How many couplets should each ghazal have? (5-15 recommended)"),
        LengthUnit::Paragraphs => Some("How many paragraphs should each prose poem have?"),
        LengthUnit::Lines => Some("How many lines should each poem have?"),
    }
}

/// Entries whose name or id contains the term, in catalog order.
pub fn filter_catalog(
    catalog: &crate::llm::ModelCatalog,
    term: &str,
    limit: usize,
) -> Vec<(String, String)> {
    let needle = term.trim().to_ascii_lowercase();
    catalog
        .iter()
        .filter(|entry| {
            needle.is_empty()
                || entry.name.to_ascii_lowercase().contains(&needle)
                || entry.id.to_ascii_lowercase().contains(&needle)
        })
        .take(limit)
        .map(|entry| (entry.name.clone(), entry.id.clone()))
        .collect()
}

async fn pick_direct_model<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    factory: &dyn ClientFactory,
    provider: Provider,
) -> Result<Option<String>> {
    let catalog = match factory.list_models(provider, None).await {
        Ok(catalog) if !catalog.is_empty() => catalog,
        Ok(_) => return Ok(None),
        Err(err) => {
            tracing::warn!(provider = provider.label(), error = %err, "model listing failed");
            return Ok(None);
        }
    };
    let names = catalog.names();
    let idx = prompter.choose(&format!("Available {} models:", provider.label()), &names, 0)?;
    Ok(names.get(idx).cloned())
}

async fn pick_openrouter_model<R: BufRead, W: Write>(
    prompter: &mut Prompter<R, W>,
    factory: &dyn ClientFactory,
    agent_number: usize,
) -> Result<String> {
    let term = prompter
        .ask(&format!(
            "Search OpenRouter models for agent {agent_number} (e.g. claude, gpt, llama) [{DEFAULT_OPENROUTER_SEARCH}]:"
        ))?
        .filter(|answer| !answer.is_empty())
        .unwrap_or_else(|| DEFAULT_OPENROUTER_SEARCH.to_string());

    let catalog = match factory.list_models(Provider::Openrouter, None).await {
        Ok(catalog) => catalog,
        Err(err) => {
            tracing::warn!(error = %err, "OpenRouter model listing failed, using search term");
            return Ok(term);
        }
    };
    let matches = filter_catalog(&catalog, &term, OPENROUTER_SEARCH_RESULTS);
    if matches.is_empty() {
        prompter.say(&format!("No models matched '{term}'; the closest match will be used."))?;
        return Ok(term);
    }
    let labels = matches
        .iter()
        .map(|(name, id)| format!("{name} ({id})"))
        .collect::<Vec<_>>();
    let idx = prompter.choose("Matching OpenRouter models:", &labels, 0)?;
    Ok(matches
        .get(idx)
        .map(|(_, id)| id.clone())
        .unwrap_or(term))
}

/// Turns flags, profile values and (optionally) terminal answers into a
/// validated dialogue configuration.
pub async fn build_dialogue_config<R: BufRead, W: Write>(
    args: &GenerateArgs,
    cfg: &RuntimeConfig,
    factory: &dyn ClientFactory,
    mut prompter: Option<&mut Prompter<R, W>>,
) -> Result<DialogueConfig> {
    let mut use_openrouter = args.openrouter;
    let provider_given = [
        args.agent1_provider.or(cfg.agent1_provider),
        args.agent2_provider.or(cfg.agent2_provider),
    ];
    let model_given = [
        args.agent1_model.clone().or_else(|| cfg.agent1_model.clone()),
        args.agent2_model.clone().or_else(|| cfg.agent2_model.clone()),
    ];

    if !use_openrouter
        && provider_given.iter().all(Option::is_none)
        && let Some(prompter) = prompter.as_deref_mut()
    {
        let modes = vec![
            "Direct provider APIs (Claude, Gemini, OpenAI)".to_string(),
            "OpenRouter (one key, many models)".to_string(),
        ];
        use_openrouter = prompter.choose("Select mode:", &modes, 0)? == 1;
    }

    let defaults = DialogueConfig::default();
    let mut agents = Vec::with_capacity(2);
    for idx in 0..2 {
        let agent_number = idx + 1;
        let choice = if use_openrouter {
            let model = match (&model_given[idx], prompter.as_deref_mut()) {
                (Some(model), _) => model.clone(),
                (None, Some(prompter)) => {
                    pick_openrouter_model(prompter, factory, agent_number).await?
                }
                (None, None) => DEFAULT_OPENROUTER_SEARCH.to_string(),
            };
            AgentChoice::new(Provider::Openrouter, Some(&model))
        } else {
            let provider = match (provider_given[idx], prompter.as_deref_mut()) {
                (Some(provider), _) => provider,
                (None, Some(prompter)) => {
                    let labels = DIRECT_PROVIDERS
                        .iter()
                        .map(|provider| provider.label().to_string())
                        .collect::<Vec<_>>();
                    let default = DIRECT_PROVIDERS
                        .iter()
                        .position(|provider| *provider == defaults.agents[idx].provider)
                        .unwrap_or(0);
                    let picked = prompter.choose(
                        &format!("Select provider for agent {agent_number}:"),
                        &labels,
                        default,
                    )?;
                    DIRECT_PROVIDERS[picked]
                }
                (None, None) => defaults.agents[idx].provider,
            };
            let model = match (&model_given[idx], prompter.as_deref_mut()) {
                (Some(model), _) => Some(model.clone()),
                (None, Some(prompter)) if provider != Provider::Openrouter => {
                    pick_direct_model(prompter, factory, provider).await?
                }
                (None, Some(prompter)) => {
                    Some(pick_openrouter_model(prompter, factory, agent_number).await?)
                }
                (None, None) => None,
            };
            AgentChoice::new(provider, model.as_deref())
        };
        agents.push(choice);
    }

    let theme = match (args.theme.as_deref().map(str::trim), prompter.as_deref_mut()) {
        (Some(theme), _) if !theme.is_empty() => theme.to_string(),
        (_, Some(prompter)) => {
            prompter.ask_required("What theme should the poets explore?", "a theme")?
        }
        (_, None) => {
            return Err(
                PoetryError::Validation("a theme is required (pass --theme)".to_string()).into(),
            );
        }
    };

    let form = match (args.form.or(cfg.form), prompter.as_deref_mut()) {
        (Some(form), _) => form,
        (None, Some(prompter)) => {
            let names = PoetryForm::ALL
                .iter()
                .map(|form| form.as_str().to_string())
                .collect::<Vec<_>>();
            let idx = prompter.choose("Select a poetry form:", &names, 0)?;
            parse_form(&names[idx])?
        }
        (None, None) => defaults.form,
    };

    let requested_length = match (args.length.or(cfg.poem_length), prompter.as_deref_mut()) {
        (Some(length), _) => Some(length),
        (None, Some(prompter)) => match length_question(form) {
            Some(question) => Some(prompter.ask_number(question, form.default_length())?),
            None => None,
        },
        (None, None) => None,
    };
    let (poem_length, length_unit) = resolve_poem_length(form, requested_length);

    let conversation_length = match (args.rounds.or(cfg.conversation_length), prompter.as_deref_mut()) {
        (Some(rounds), _) => rounds,
        (None, Some(prompter)) => prompter.ask_number("How many rounds of conversation?", 1)?,
        (None, None) => defaults.conversation_length,
    };

    let use_emojis = match (args.emojis.or(cfg.use_emojis), prompter.as_deref_mut()) {
        (Some(flag), _) => flag,
        (None, Some(prompter)) => prompter.ask_yes_no("Add emojis to the poems?", false)?,
        (None, None) => false,
    };

    let use_critique = args.critique.unwrap_or(cfg.critique);

    let config = DialogueConfig {
        theme,
        num_agents: 2,
        form,
        poem_length,
        length_unit,
        conversation_length,
        use_openrouter,
        use_emojis,
        use_critique,
        output_format: defaults.output_format,
        agents,
    };
    config.validate()?;
    Ok(config)
}
