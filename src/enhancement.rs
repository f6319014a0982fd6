//! Best-effort post-processing of generated poetry.
//!
//! Both operations degrade instead of failing: a broken ASCII-art call yields
//! an empty block and a broken emoji call leaves the poem untouched.

use std::sync::Arc;

use crate::llm::LlmClient;

const ASCII_ART_MAX_TOKENS: u32 = 250;
const EMOJI_MAX_TOKENS: u32 = 400;

pub fn ascii_art_prompt(theme: &str) -> String {
    format!(
        r#"Create simple ASCII art (text art) that represents the poetic theme: "{theme}".

Guidelines:
- Use only basic ASCII characters: - | / \ * + = ~ ^ v < > . : ; ' " ( ) [ ] {{ }} @ # $ % &
- Keep it small but impactful (4-8 lines maximum)
- Make it visually appealing and thematically appropriate
- Consider the poetic and artistic nature of the theme
- Create something that would complement poetry about this theme

Examples of good ASCII art themes:
- Snow/winter: snowflakes, bare trees, mountains
- Ocean/water: waves, boats, fish
- Night/stars: moon, stars, constellation patterns
- Love/romance: hearts, flowers, intertwined elements
- Archery: bows, arrows, targets
- Games: board patterns, pieces
- Nature: trees, animals, landscapes

Return ONLY the ASCII art with no explanatory text or comments."#
    )
}

pub fn emoji_prompt(poetry: &str, theme: &str) -> String {
    format!(
        r#"Add emojis to enhance this poetry about "{theme}".

Instructions:
- Place emojis immediately AFTER words they represent (word🌟 not 🌟word)
- Only add emojis to nouns, nature words, emotions, and vivid imagery words
- Don't add emojis to articles, prepositions, or common words like "the", "and", "in"
- Use 2-4 emojis per line maximum to avoid overwhelming the poetry
- Choose emojis that enhance the poetic imagery and theme
- Preserve the exact line structure and spacing of the original
- Return ONLY the enhanced poetry with no explanatory text or comments

Original poetry:
{poetry}

Return the poetry with emojis added, maintaining the same line breaks and structure."#
    )
}

#[derive(Clone)]
pub struct EnhancementService {
    client: Arc<dyn LlmClient>,
}

impl EnhancementService {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }

    pub async fn generate_ascii_art(&self, theme: &str) -> String {
        match self
            .client
            .generate(&ascii_art_prompt(theme), ASCII_ART_MAX_TOKENS)
            .await
        {
            Ok(art) => art.trim().to_string(),
            Err(err) => {
                tracing::warn!(
                    error = %err,
                    "ASCII art generation failed, proceeding without ASCII art"
                );
                String::new()
            }
        }
    }

    pub async fn add_emojis(&self, poetry: &str, theme: &str) -> String {
        match self
            .client
            .generate(&emoji_prompt(poetry, theme), EMOJI_MAX_TOKENS)
            .await
        {
            Ok(enhanced) => enhanced.trim().to_string(),
            Err(err) => {
                tracing::warn!(error = %err, "emoji enhancement failed, keeping original poem");
                poetry.to_string()
            }
        }
    }
}
