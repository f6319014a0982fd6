use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleCategory {
    LanguageStyle,
    EmotionalThematic,
    TechnicalCraft,
    FormalStructure,
    QualityRefinement,
}

impl RuleCategory {
    pub const ALL: [RuleCategory; 5] = [
        RuleCategory::LanguageStyle,
        RuleCategory::EmotionalThematic,
        RuleCategory::TechnicalCraft,
        RuleCategory::FormalStructure,
        RuleCategory::QualityRefinement,
    ];

    pub fn key(self) -> &'static str {
        match self {
            RuleCategory::LanguageStyle => "language_style",
            RuleCategory::EmotionalThematic => "emotional_thematic",
            RuleCategory::TechnicalCraft => "technical_craft",
            RuleCategory::FormalStructure => "formal_structure",
            RuleCategory::QualityRefinement => "quality_refinement",
        }
    }

    pub fn from_key(key: &str) -> Option<RuleCategory> {
        Self::ALL.into_iter().find(|category| category.key() == key)
    }

    /// `language_style` renders as `Language Style`.
    pub fn title(self) -> String {
        self.key()
            .split('_')
            .map(|word| {
                let mut chars = word.chars();
                match chars.next() {
                    Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                    None => String::new(),
                }
            })
            .collect::<Vec<String>>()
            .join(" ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CraftRule {
    pub id: &'static str,
    pub category: RuleCategory,
    pub title: &'static str,
    pub rule: &'static str,
    pub critique_focus: &'static str,
    pub edit_guidance: &'static str,
}

pub static CRAFT_RULES: &[CraftRule] = &[
    CraftRule {
        id: "TS1",
        category: RuleCategory::LanguageStyle,
        title: "Avoid Archaic Language",
        rule: "Do not use archaic words: o'er, thee, thou, behest, or forsooth",
        critique_focus: "Check for archaic language usage",
        edit_guidance: "Replace archaic terms with modern, accessible language",
    },
    CraftRule {
        id: "TS2",
        category: RuleCategory::LanguageStyle,
        title: "Prefer Concrete Words",
        rule: "Use concrete words over abstract words for stronger imagery",
        critique_focus: "Assess balance of concrete vs abstract language",
        edit_guidance: "Replace abstract concepts with tangible, specific imagery",
    },
    CraftRule {
        id: "TS3",
        category: RuleCategory::LanguageStyle,
        title: "Use Idiomatic Language",
        rule: "Employ natural, conversational phrasing unless heightened diction is required",
        critique_focus: "Evaluate naturalness and accessibility of language",
        edit_guidance: "Rewrite awkward or unnatural phrases with idiomatic expressions",
    },
    CraftRule {
        id: "TS4",
        category: RuleCategory::LanguageStyle,
        title: "Avoid Forced Inversions",
        rule: "Refrain from inverting natural word order just to meet rhyming or metrical constraints",
        critique_focus: "Identify awkward word order inversions",
        edit_guidance: "Restructure lines to maintain natural syntax while preserving form",
    },
    CraftRule {
        id: "ET1",
        category: RuleCategory::EmotionalThematic,
        title: "Use Mixed Emotions",
        rule: "Combine positive and negative emotions to create unique emotional mixes that put things in new light",
        critique_focus: "Analyze emotional complexity and balance",
        edit_guidance: "Add contrasting emotions to create depth and complexity",
    },
    CraftRule {
        id: "ET2",
        category: RuleCategory::EmotionalThematic,
        title: "Balance Emotional Tones",
        rule: "Combine contrasting emotions (love/doubt, joy/melancholy) for thematic depth",
        critique_focus: "Evaluate emotional range and sophistication",
        edit_guidance: "Introduce emotional counterpoints to avoid one-dimensional expression",
    },
    CraftRule {
        id: "ET3",
        category: RuleCategory::EmotionalThematic,
        title: "Maintain Thematic Coherence",
        rule: "Keep the poem's central theme clear throughout, even in complex forms",
        critique_focus: "Assess thematic consistency and clarity",
        edit_guidance: "Strengthen thematic connections between stanzas and sections",
    },
    CraftRule {
        id: "TC1",
        category: RuleCategory::TechnicalCraft,
        title: "Use Visual/Sensory Imagery",
        rule: "Employ vivid, sensory descriptions that evoke emotions and scenes effectively",
        critique_focus: "Evaluate strength and specificity of imagery",
        edit_guidance: "Replace generic expressions with specific, sensory-rich descriptions",
    },
    CraftRule {
        id: "TC2",
        category: RuleCategory::TechnicalCraft,
        title: "Use Appropriate Tropes",
        rule: "Use metaphors and similes when appropriate to enhance meaning",
        critique_focus: "Assess effectiveness of literary devices",
        edit_guidance: "Add or refine metaphors and similes for greater impact",
    },
    CraftRule {
        id: "TC3",
        category: RuleCategory::TechnicalCraft,
        title: "Handle Rhyme Thoughtfully",
        rule: "Avoid rhyming unless requested; use occasional rhyming words for flow in free verse",
        critique_focus: "Evaluate rhyme scheme appropriateness and execution",
        edit_guidance: "Adjust rhyming to serve the poem's flow and meaning, not force it",
    },
    CraftRule {
        id: "FS1",
        category: RuleCategory::FormalStructure,
        title: "Adhere to Poetic Form",
        rule: "Respect structural rules of specific forms (sestinas, sonnets, villanelles)",
        critique_focus: "Check strict adherence to form requirements",
        edit_guidance: "Correct form violations while preserving meaning and flow",
    },
    CraftRule {
        id: "FS2",
        category: RuleCategory::FormalStructure,
        title: "Maintain Natural Scansion",
        rule: "Ensure lines flow smoothly and adhere to intended meter without awkward phrasing",
        critique_focus: "Analyze rhythm, meter, and flow of lines",
        edit_guidance: "Adjust phrasing to improve scansion while maintaining meaning",
    },
    CraftRule {
        id: "FS3",
        category: RuleCategory::FormalStructure,
        title: "Pay Attention to Endings",
        rule: "Ensure conclusions resonate emotionally and adhere to form rules",
        critique_focus: "Evaluate effectiveness and form-compliance of endings",
        edit_guidance: "Strengthen endings for emotional impact and formal completion",
    },
    CraftRule {
        id: "FS4",
        category: RuleCategory::FormalStructure,
        title: "Consider Poem Structure",
        rule: "The poem need not be merely descriptive; explore narrative, emotional, or philosophical dimensions",
        critique_focus: "Assess structural variety and purpose beyond description",
        edit_guidance: "Expand beyond description to include narrative or reflective elements",
    },
    CraftRule {
        id: "QR1",
        category: RuleCategory::QualityRefinement,
        title: "Avoid Clichés",
        rule: "Avoid overused phrases and expressions that lack originality",
        critique_focus: "Identify clichéd language and tired expressions",
        edit_guidance: "Replace clichés with fresh, original expressions",
    },
    CraftRule {
        id: "QR2",
        category: RuleCategory::QualityRefinement,
        title: "Iterate to Perfection",
        rule: "Poetry requires revision to align with formal constraints, thematic intent, and emotional resonance",
        critique_focus: "Evaluate overall need for refinement and improvement",
        edit_guidance: "Apply multiple revision passes to perfect craft and meaning",
    },
];

const AVOID: &[&str] = &[
    "Archaic language (o'er, thee, thou, behest, forsooth)",
    "Abstract language without concrete imagery",
    "Forced word order inversions",
    "One-dimensional emotions",
    "Generic or vague descriptions",
    "Inappropriate or forced rhyming",
    "Form rule violations",
    "Awkward rhythm or scansion",
    "Weak or unsatisfying endings",
    "Clichéd expressions",
    "Overly complex metaphors",
];

const ENHANCE: &[&str] = &[
    "Mixed emotional complexity (positive + negative)",
    "Concrete, sensory-rich imagery",
    "Natural, idiomatic language",
    "Thematic coherence throughout",
    "Appropriate metaphors and similes",
    "Natural scansion and rhythm",
    "Strong, resonant endings",
    "Form-specific structural elements",
    "Original, fresh expressions",
    "Narrative or philosophical depth beyond description",
];

pub fn rules_by_category(category: RuleCategory) -> Vec<&'static CraftRule> {
    CRAFT_RULES
        .iter()
        .filter(|rule| rule.category == category)
        .collect()
}

pub fn categories() -> Vec<&'static str> {
    RuleCategory::ALL.iter().map(|category| category.key()).collect()
}

fn format_rules(detail: impl Fn(&CraftRule) -> &'static str) -> String {
    let mut lines = Vec::new();
    for category in RuleCategory::ALL {
        lines.push(format!("**{}:**", category.title()));
        for rule in rules_by_category(category) {
            lines.push(format!("- **{}**: {}", rule.title, detail(rule)));
        }
    }
    lines.join("\n")
}

/// What the judge should look for, grouped by category.
pub fn critique_rules() -> String {
    format_rules(|rule| rule.critique_focus)
}

/// How the judge should revise, grouped by category.
pub fn editing_rules() -> String {
    format_rules(|rule| rule.edit_guidance)
}

pub fn avoid_list() -> &'static [&'static str] {
    AVOID
}

pub fn enhance_list() -> &'static [&'static str] {
    ENHANCE
}
