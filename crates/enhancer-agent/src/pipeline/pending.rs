//! Pending-text codec.
//!
//! The text awaiting an enhancement lives only in the message that shows the
//! enhancement menu. This module is the one place that knows how that
//! message is laid out:
//!
//! ```text
//! <header>
//!
//! <pending text>
//!
//! Choose an enhancement:
//! ```
//!
//! Pending messages must be sent without a parse mode so the text the
//! platform echoes back on a button press is byte-identical to what
//! [`render_pending`] produced.

use enhancer_core::EnhancerError;

pub const TEXT_HEADER: &str = "📝 Your text:";
pub const VOICE_HEADER: &str = "🎤 Transcribed text:";
pub const FOOTER: &str = "Choose an enhancement:";

/// Where the pending text came from; selects the header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingSource {
    Typed,
    Voice,
}

impl PendingSource {
    fn header(self) -> &'static str {
        match self {
            PendingSource::Typed => TEXT_HEADER,
            PendingSource::Voice => VOICE_HEADER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExtractionError {
    #[error("message does not start with a pending-text header")]
    MissingHeader,
    #[error("message has no enhancement footer")]
    MissingFooter,
    #[error("pending text is empty")]
    Empty,
}

impl From<ExtractionError> for EnhancerError {
    fn from(e: ExtractionError) -> Self {
        EnhancerError::ExtractionFailure(e.to_string())
    }
}

pub fn render_pending(source: PendingSource, text: &str) -> String {
    format!("{}\n\n{}\n\n{}", source.header(), text, FOOTER)
}

/// Recover the pending text from a displayed menu message.
///
/// The footer is matched from the end, so pending text that itself contains
/// the footer line survives.
pub fn extract_pending(display: &str) -> Result<String, ExtractionError> {
    let display = display.trim();
    let body = [TEXT_HEADER, VOICE_HEADER]
        .iter()
        .find_map(|h| display.strip_prefix(h))
        .ok_or(ExtractionError::MissingHeader)?;

    let footer = format!("\n\n{FOOTER}");
    let end = body.rfind(&footer).ok_or(ExtractionError::MissingFooter)?;
    if !body[end + footer.len()..].trim().is_empty() {
        return Err(ExtractionError::MissingFooter);
    }

    let text = body[..end].trim();
    if text.is_empty() {
        return Err(ExtractionError::Empty);
    }
    Ok(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_text_round_trips() {
        let shown = render_pending(PendingSource::Typed, "привет, как дела");
        assert_eq!(extract_pending(&shown).unwrap(), "привет, как дела");
    }

    #[test]
    fn voice_text_round_trips() {
        let shown = render_pending(PendingSource::Voice, "create a function");
        assert!(shown.starts_with(VOICE_HEADER));
        assert_eq!(extract_pending(&shown).unwrap(), "create a function");
    }

    #[test]
    fn multiline_text_keeps_inner_blank_lines() {
        let text = "first paragraph\n\nsecond paragraph\n- bullet";
        let shown = render_pending(PendingSource::Typed, text);
        assert_eq!(extract_pending(&shown).unwrap(), text);
    }

    #[test]
    fn text_containing_footer_survives() {
        let text = "Choose an enhancement:\n\nChoose an enhancement: twice";
        let shown = render_pending(PendingSource::Typed, text);
        assert_eq!(extract_pending(&shown).unwrap(), text);
    }

    #[test]
    fn surrounding_whitespace_is_trimmed() {
        let shown = format!("\n{TEXT_HEADER}\n\n   padded  \n\n{FOOTER}\n");
        assert_eq!(extract_pending(&shown).unwrap(), "padded");
    }

    #[test]
    fn foreign_messages_are_rejected() {
        assert_eq!(
            extract_pending("✅ Enhancer removed!"),
            Err(ExtractionError::MissingHeader)
        );
        assert_eq!(
            extract_pending(&format!("{TEXT_HEADER}\n\nno footer here")),
            Err(ExtractionError::MissingFooter)
        );
        assert_eq!(
            extract_pending(&format!("{TEXT_HEADER}\n\n \n\n{FOOTER}")),
            Err(ExtractionError::Empty)
        );
    }

    #[test]
    fn trailing_content_after_footer_is_rejected() {
        let shown = format!("{TEXT_HEADER}\n\nhello\n\n{FOOTER}\nextra");
        assert_eq!(extract_pending(&shown), Err(ExtractionError::MissingFooter));
    }
}
