//! Messaging transport seen from the router: one chat, four operations.

use async_trait::async_trait;

use enhancer_core::EnhancerError;

/// Handle to a message previously sent into the chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageRef(pub i32);

/// Inline button: a label plus the action token delivered when pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub action: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: impl std::fmt::Display) -> Self {
        Self {
            label: label.into(),
            action: action.to_string(),
        }
    }
}

/// Inline keyboard, row by row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<Button>>,
}

impl Keyboard {
    /// One button per row.
    pub fn column(buttons: impl IntoIterator<Item = Button>) -> Self {
        Self {
            rows: buttons.into_iter().map(|b| vec![b]).collect(),
        }
    }

    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("transport error: {0}")]
pub struct TransportError(pub String);

impl From<TransportError> for EnhancerError {
    fn from(e: TransportError) -> Self {
        EnhancerError::CollaboratorFailure {
            service: "messaging".to_string(),
            reason: e.0,
        }
    }
}

/// A chat the router can write into. Implemented over teloxide by the
/// Telegram adapter and by recording fakes in tests.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, text: &str, keyboard: Option<&Keyboard>)
        -> Result<MessageRef, TransportError>;

    /// Replace the text (and keyboard) of an existing message. `None`
    /// removes the keyboard.
    async fn edit(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError>;

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError>;

    /// Download an attachment (voice clip) by its platform file id.
    async fn fetch_media(&self, file_id: &str) -> Result<Vec<u8>, TransportError>;
}
