use crate::cli::PoetryForm;
use crate::config::LengthUnit;
use crate::dialogue::ConversationTurn;
use crate::personas::enhanced_persona;
use crate::rules::{formatting_rules, poetry_rules, quality_guidelines};

/// A haiku measured in lines is a single 3-line poem; counting in stanzas asks
/// for a sequence instead.
fn is_haiku_sequence(length: u32, unit: LengthUnit) -> bool {
    unit != LengthUnit::Lines && length > 1
}

pub fn initial_poetry_prompt(theme: &str, form: PoetryForm, length: u32, unit: LengthUnit) -> String {
    let measure = format!("{length} {}", unit.label(length));
    match form {
        PoetryForm::Haiku if is_haiku_sequence(length, unit) => format!(
            "Create a haiku sequence of {measure} about {theme}. Each stanza should be 3 lines following the 5-7-5 syllable pattern."
        ),
        PoetryForm::Haiku => format!(
            "Create a haiku (5-7-5 syllables) about {theme}. Present it as a single 3-line haiku."
        ),
        PoetryForm::Prose => format!(
            "Create a prose poem of {measure} about {theme}. Use free verse with natural language flow."
        ),
        other => format!("Create a {} poem of {measure} about {theme}.", other.as_str()),
    }
}

pub fn response_poetry_prompt(
    agent_name: &str,
    previous_poetry: &str,
    form: PoetryForm,
    length: u32,
    unit: LengthUnit,
) -> String {
    let measure = format!("{length} {}", unit.label(length));
    match form {
        PoetryForm::Haiku if is_haiku_sequence(length, unit) => format!(
            "You are {agent_name}. Respond to this poetry with a haiku sequence of {measure}. Each stanza should be 3 lines following the 5-7-5 syllable pattern. Incorporate elements, words, or themes from the previous poetry:\n\n{previous_poetry}\n\nYour response:"
        ),
        PoetryForm::Haiku => format!(
            "You are {agent_name}. Respond to this poetry with a haiku (5-7-5 syllables). Incorporate elements, words, or themes from the previous poetry:\n\n{previous_poetry}\n\nYour response as a single 3-line haiku:"
        ),
        PoetryForm::Prose => format!(
            "You are {agent_name}. Respond to this poetry with a prose poem of {measure}. Use free verse and incorporate elements, words, or themes from the previous poetry:\n\n{previous_poetry}\n\nYour response:"
        ),
        other => format!(
            "You are {agent_name}. Respond to this poetry with a {} poem of {measure}. Incorporate elements, words, or themes from the previous poetry:\n\n{previous_poetry}\n\nYour response:",
            other.as_str()
        ),
    }
}

pub fn title_prompt(theme: &str) -> String {
    format!(
        "Create a short, poetic title (2-4 words) based on this theme: {theme}. Return only the title, nothing else."
    )
}

/// The transcript a responding agent sees: every earlier turn, with the most
/// recent poem repeated last as the one to answer.
pub fn conversation_context(theme: &str, history: &[ConversationTurn]) -> String {
    let mut context = format!("CONVERSATION THEME: {theme}\n\nCONVERSATION SO FAR:\n");
    for turn in history {
        context.push_str(&format!(
            "\nRound {} - {}:\n{}\n",
            turn.round, turn.agent, turn.poetry
        ));
    }
    if let Some(last) = history.last() {
        context.push_str(&format!(
            "\nMOST RECENT POEM (respond directly to this) - {}:\n{}",
            last.agent, last.poetry
        ));
    }
    context
}

/// Full prompt for one turn: persona, form rules, formatting and quality
/// guidance, then the task itself.
pub fn turn_prompt(agent_name: &str, form: PoetryForm, task: &str) -> String {
    format!(
        "{persona}\n\n{rules}\n\n{formatting}\n\n{quality}\n\nTASK: {task}",
        persona = enhanced_persona(agent_name),
        rules = poetry_rules(form),
        formatting = formatting_rules(),
        quality = quality_guidelines(),
    )
}
