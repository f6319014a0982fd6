/// Static rule text fed into prompts: structural rules per poetic form, and
/// the craft rubric the judge critiques and edits against.
pub mod forms;
pub mod turner;

pub use forms::{formatting_rules, poetry_rules, quality_guidelines};
