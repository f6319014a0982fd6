use std::path::{Path, PathBuf};

use anyhow::Result;
use chrono::Local;

use crate::cli::PoetryForm;
use crate::config::LengthUnit;
use crate::dialogue::{ConversationTurn, DialogueResult};
use crate::error::PoetryError;
use crate::personas::character_info;

/// "3 lines (traditional haiku)" for fixed forms, "2 stanzas" / "1 couplet" otherwise.
pub fn length_description(length: u32, unit: LengthUnit, form: PoetryForm) -> String {
    match form.fixed_length() {
        Some(_) => format!("{length} {} (traditional {})", unit.label(length), form.as_str()),
        None => format!("{length} {}", unit.label(length)),
    }
}

fn agent_model(result: &DialogueResult, agent_index: usize) -> Option<&str> {
    result
        .conversation
        .iter()
        .find(|turn| turn.agent_index == agent_index)
        .map(|turn| turn.llm_used.as_str())
        .filter(|label| !label.is_empty())
}

fn push_turns(out: &mut Vec<String>, turns: &[ConversationTurn]) {
    for turn in turns {
        out.push(format!("### Round {}: {}", turn.round, turn.agent));
        out.push(String::new());
        out.push(turn.poetry.trim().to_string());
        out.push(String::new());
    }
}

pub fn render_dialogue_markdown(result: &DialogueResult) -> String {
    render_with_timestamp(result, &Local::now().format("%Y-%m-%d %H:%M:%S").to_string())
}

fn render_with_timestamp(result: &DialogueResult, generated_at: &str) -> String {
    let config = &result.config;
    let mut out = vec![format!("# {}", result.title), String::new()];

    if !result.ascii_art.trim().is_empty() {
        out.push("```".to_string());
        out.push(result.ascii_art.trim_end().to_string());
        out.push("```".to_string());
        out.push(String::new());
    }

    out.push("## Configuration".to_string());
    out.push(String::new());
    out.push(format!("- **Theme:** {}", config.theme));
    out.push(format!("- **Form:** {}", config.form.as_str()));
    out.push(format!(
        "- **Length:** {}",
        length_description(config.poem_length, config.length_unit, config.form)
    ));
    out.push(format!("- **Rounds:** {}", config.conversation_length));
    out.push(format!(
        "- **Emojis:** {}",
        if config.use_emojis { "yes" } else { "no" }
    ));
    for (idx, agent) in result.agents.iter().enumerate() {
        if let Some(model) = agent_model(result, idx) {
            out.push(format!("- **{agent}:** {model}"));
        }
    }
    out.push(String::new());

    out.push("## The Poets".to_string());
    out.push(String::new());
    for agent in &result.agents {
        let info = character_info(agent);
        out.push(format!("### {agent}"));
        out.push(String::new());
        out.push(format!("*Source:* {}", info.source));
        out.push(String::new());
        out.push(format!("*Qualities:* {}", info.qualities));
        out.push(String::new());
    }

    out.push("## The Dialogue".to_string());
    out.push(String::new());
    push_turns(&mut out, &result.conversation);

    if let Some(critique) = &result.critique {
        out.push("## Judge Critique".to_string());
        out.push(String::new());
        out.push(format!(
            "*Judge: {} ({})*",
            critique.judge_provider, critique.judge_model
        ));
        out.push(String::new());
        out.push(critique.critique_text.trim().to_string());
        out.push(String::new());

        out.push("## Edited Dialogue".to_string());
        out.push(String::new());
        push_turns(&mut out, &critique.edited_conversation);
    }

    out.push("---".to_string());
    out.push(String::new());
    out.push(format!("*Generated by Poetry Agents on {generated_at}*"));
    out.push(String::new());
    out.join("\n")
}

pub fn default_filename() -> String {
    format!("poetry_dialogue_{}.md", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Writes the dialogue and returns the path written. Without a filename the
/// file lands in `output_dir` under a timestamped name; a given filename is
/// used as-is.
pub fn save_dialogue_to_markdown(
    result: &DialogueResult,
    output_dir: &Path,
    filename: Option<&str>,
) -> Result<PathBuf> {
    let path = match filename.map(str::trim).filter(|name| !name.is_empty()) {
        Some(name) => PathBuf::from(name),
        None => output_dir.join(default_filename()),
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|err| {
            PoetryError::FileOperation(format!(
                "failed to create output directory '{}': {err}",
                parent.display()
            ))
        })?;
    }

    std::fs::write(&path, render_dialogue_markdown(result)).map_err(|err| {
        PoetryError::FileOperation(format!(
            "failed to write dialogue to '{}': {err}",
            path.display()
        ))
    })?;
    tracing::info!(path = %path.display(), "dialogue saved");
    Ok(path)
}
