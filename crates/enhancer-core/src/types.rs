use serde::{Deserialize, Serialize};

/// Which rewriting rule a request asks for.
///
/// The wire form (`grammar`, `prompt_enhancement`, `custom`) is shared by
/// serde and by inline-button action tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnhancementKind {
    Grammar,
    PromptEnhancement,
    Custom,
}

impl EnhancementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnhancementKind::Grammar => "grammar",
            EnhancementKind::PromptEnhancement => "prompt_enhancement",
            EnhancementKind::Custom => "custom",
        }
    }
}

impl std::fmt::Display for EnhancementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EnhancementKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "grammar" => Ok(EnhancementKind::Grammar),
            "prompt_enhancement" => Ok(EnhancementKind::PromptEnhancement),
            "custom" => Ok(EnhancementKind::Custom),
            other => Err(format!("unknown enhancement kind: {}", other)),
        }
    }
}

/// Output of one rewrite. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementResult {
    pub original_text: String,
    pub enhanced_text: String,
    pub kind: EnhancementKind,
    pub changes_summary: Option<String>,
}

/// Classifier verdict used to order the enhancement menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Prompt,
    Text,
}

impl ContentType {
    /// Interpret a raw classifier reply. Anything but `prompt` counts as text.
    pub fn from_reply(reply: &str) -> Self {
        if reply.trim().trim_matches('"').eq_ignore_ascii_case("prompt") {
            ContentType::Prompt
        } else {
            ContentType::Text
        }
    }
}
