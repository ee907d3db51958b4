use serde::{Deserialize, Serialize};

use enhancer_core::config::DEFAULT_LANGUAGE;

/// Id prefix shared by every custom enhancer (`custom_1`, `custom_2`, ...).
pub const ENHANCER_ID_PREFIX: &str = "custom_";

/// A user-authored rewriting rule. `prompt` is sent verbatim as the system
/// instruction when the user picks it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEnhancer {
    pub id: String,
    pub name: String,
    pub prompt: String,
    #[serde(default)]
    pub description: Option<String>,
}

impl CustomEnhancer {
    /// Numeric suffix of a `custom_<n>` id, if the id has that shape.
    pub fn sequence(&self) -> Option<u32> {
        self.id.strip_prefix(ENHANCER_ID_PREFIX)?.parse().ok()
    }
}

/// Persisted per-user record. One per Telegram user, created on first contact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub user_id: i64,
    /// Insertion order; length bounded by the registry cap.
    #[serde(default)]
    pub custom_enhancers: Vec<CustomEnhancer>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Highest enhancer sequence ever handed out for this profile.
    /// Absent in stores written before ids became monotonic.
    #[serde(default)]
    pub enhancer_seq: u32,
}

impl UserProfile {
    pub fn new(user_id: i64) -> Self {
        Self {
            user_id,
            custom_enhancers: Vec::new(),
            language: default_language(),
            enhancer_seq: 0,
        }
    }

    /// Next `custom_<n>` id. Never repeats an id this profile has held, and
    /// never collides with ids already present (older stores may carry ids
    /// beyond `enhancer_seq`).
    pub(crate) fn next_enhancer_id(&mut self) -> String {
        let highest_present = self
            .custom_enhancers
            .iter()
            .filter_map(CustomEnhancer::sequence)
            .max()
            .unwrap_or(0);
        self.enhancer_seq = self.enhancer_seq.max(highest_present) + 1;
        format!("{ENHANCER_ID_PREFIX}{}", self.enhancer_seq)
    }
}

fn default_language() -> String {
    DEFAULT_LANGUAGE.to_string()
}
