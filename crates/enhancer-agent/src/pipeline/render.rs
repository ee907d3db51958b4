//! User-facing texts and keyboards.

use enhancer_core::config::LimitsConfig;
use enhancer_core::types::{ContentType, EnhancementKind, EnhancementResult};
use enhancer_core::EnhancerError;
use enhancer_users::CustomEnhancer;

use crate::pipeline::action::Action;
use crate::pipeline::transport::{Button, Keyboard};

pub const ENHANCING: &str = "🔄 Enhancing your text...";
pub const PROCESSING_VOICE: &str = "🎤 Processing voice message...";
pub const GENERIC_FAILURE: &str =
    "❌ Something went wrong while handling your request. Please try again.";

pub fn start_text() -> String {
    "🤖 Welcome to Prompt Enhancer Bot!\n\n\
     I can improve your texts and prompts:\n\n\
     📝 Text improvement: grammar fixes, filler-word removal\n\
     🚀 Prompt enhancement: optimization for AI tools (Cursor, ChatGPT)\n\
     ⚙️ Custom enhancers: your own rewriting rules\n\n\
     How to use:\n\
     • Send a text message\n\
     • Or send a voice message\n\
     • Pick an enhancement with the buttons\n\n\
     Commands:\n\
     /start - this message\n\
     /settings - manage custom enhancers\n\
     /help - help\n\n\
     Send me any text to begin! 🎯"
        .to_string()
}

pub fn help_text(limits: &LimitsConfig) -> String {
    format!(
        "📚 Help\n\n\
         Enhancement types:\n\n\
         🔤 Grammar and style\n\
         - fixes mistakes\n\
         - improves punctuation\n\
         - removes filler words\n\
         - improves readability\n\n\
         🚀 Prompt enhancement\n\
         - structures the prompt for AI tools\n\
         - adds concrete instructions\n\
         - optimizes for Cursor, ChatGPT, Claude\n\n\
         ⚙️ Custom enhancers\n\
         - up to {max} of your own rules\n\
         - managed with /settings\n\n\
         Supported input:\n\
         - text messages\n\
         - voice messages (up to {voice} s)\n\n\
         Limits:\n\
         - at most {len} characters per message\n\
         - up to {max} custom enhancers",
        max = limits.max_custom_enhancers,
        voice = limits.max_voice_duration_secs,
        len = limits.max_message_length,
    )
}

pub fn main_menu_text() -> String {
    "🤖 Prompt Enhancer Bot\n\nSend a text or a voice message to enhance it!".to_string()
}

pub fn add_enhancer_usage() -> String {
    "➕ Adding a custom enhancer\n\n\
     Send a message in this format:\n\
     /add_enhancer Name|Description|Prompt for the AI\n\n\
     The description is optional:\n\
     /add_enhancer Name|Prompt for the AI\n\n\
     Example:\n\
     /add_enhancer Formal style|Business tone|Rewrite the text in a formal business style"
        .to_string()
}

pub fn add_enhancer_invalid(reason: &str) -> String {
    format!(
        "❌ Invalid format ({reason}). Use:\n/add_enhancer Name|Description|Prompt for the AI"
    )
}

pub fn enhancer_added(name: &str) -> String {
    format!("✅ Enhancer '{name}' added!")
}

pub fn limit_reached(limit: usize) -> String {
    format!("❌ Custom enhancer limit reached ({limit})")
}

pub fn enhancer_removed(removed: bool) -> String {
    if removed {
        "✅ Enhancer removed!".to_string()
    } else {
        "❌ Could not remove the enhancer".to_string()
    }
}

pub fn voice_too_long(max_secs: u32) -> String {
    format!("⚠️ Voice message is too long. Maximum is {max_secs} seconds.")
}

pub fn text_too_long(max_bytes: usize) -> String {
    format!(
        "⚠️ Text is too long. Together with the menu it must fit in {max_bytes} bytes \
         (about half as many Cyrillic characters). Please shorten it."
    )
}

/// Settings screen: the user's enhancers with remove buttons, an add button
/// while below `limit`, and a back button.
pub fn settings(enhancers: &[CustomEnhancer], limit: usize) -> (String, Keyboard) {
    let mut buttons = Vec::new();

    let text = if enhancers.is_empty() {
        "🔧 Custom enhancer settings\n\nYou have no custom enhancers yet.".to_string()
    } else {
        let mut text = String::from("🔧 Your custom enhancers:\n\n");
        for e in enhancers {
            text.push_str(&format!("• {}\n", e.name));
            if let Some(desc) = &e.description {
                text.push_str(&format!("  {desc}\n"));
            }
            text.push('\n');
            buttons.push(Button::new(
                format!("❌ {}", e.name),
                Action::RemoveEnhancer { id: e.id.clone() },
            ));
        }
        text.trim_end().to_string()
    };

    if enhancers.len() < limit {
        buttons.push(Button::new("➕ Add enhancer", Action::AddEnhancer));
    }
    buttons.push(Button::new("🔙 Back", Action::BackToMain));

    (text, Keyboard::column(buttons))
}

/// Enhancement menu shown under pending text. Both built-in kinds are always
/// offered; the classifier only decides which comes first.
pub fn enhancement_menu(
    user_id: i64,
    content: ContentType,
    enhancers: &[CustomEnhancer],
) -> Keyboard {
    let builtin = |label: &str, kind| {
        Button::new(
            label,
            Action::Enhance {
                kind,
                user_id,
                enhancer_id: None,
            },
        )
    };
    let prompt = builtin("🚀 Enhance prompt", EnhancementKind::PromptEnhancement);
    let grammar = builtin("🔤 Improve grammar", EnhancementKind::Grammar);

    let mut buttons = match content {
        ContentType::Prompt => vec![prompt, grammar],
        ContentType::Text => vec![grammar, prompt],
    };
    for e in enhancers {
        buttons.push(Button::new(
            format!("⚙️ {}", e.name),
            Action::Enhance {
                kind: EnhancementKind::Custom,
                user_id,
                enhancer_id: Some(e.id.clone()),
            },
        ));
    }

    Keyboard::column(buttons)
}

/// Title line for a finished enhancement. Custom enhancers show their name.
pub fn kind_title(kind: EnhancementKind, custom_name: Option<&str>) -> String {
    match (kind, custom_name) {
        (EnhancementKind::Grammar, _) => "🔤 Grammar improvement".to_string(),
        (EnhancementKind::PromptEnhancement, _) => "🚀 Prompt enhancement".to_string(),
        (EnhancementKind::Custom, Some(name)) => format!("⚙️ {name}"),
        (EnhancementKind::Custom, None) => "⚙️ Custom enhancement".to_string(),
    }
}

pub fn result(result: &EnhancementResult, custom_name: Option<&str>) -> String {
    format!(
        "{}\n\n📝 Original text:\n{}\n\n✨ Enhanced text:\n{}",
        kind_title(result.kind, custom_name),
        result.original_text,
        result.enhanced_text,
    )
}

/// Message shown in place of a failed operation.
pub fn error(err: &EnhancerError) -> String {
    match err {
        EnhancerError::LimitExceeded { limit } => limit_reached(*limit),
        EnhancerError::InvalidEnhancement(reason) => format!("❌ Invalid enhancement: {reason}"),
        EnhancerError::ExtractionFailure(_) => {
            "❌ Could not find the text to enhance".to_string()
        }
        EnhancerError::CollaboratorFailure { service, reason } => {
            format!("❌ {service} error: {reason}")
        }
        EnhancerError::Config(_) | EnhancerError::Serialization(_) | EnhancerError::Io(_) => {
            GENERIC_FAILURE.to_string()
        }
    }
}
