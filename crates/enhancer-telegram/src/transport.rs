//! [`Transport`] over the Telegram Bot API, bound to one chat.
//!
//! Texts go out without a parse mode so that what Telegram echoes back on
//! a button press matches what the router rendered.

use std::time::Duration;

use async_trait::async_trait;
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup, MessageId};
use teloxide::{ApiError, RequestError};
use tracing::debug;

use enhancer_agent::pipeline::{Keyboard, MessageRef, Transport, TransportError};

use crate::send::split_chunks_smart;

/// Pause between consecutive chunks of one long text.
const CHUNK_DELAY: Duration = Duration::from_millis(100);

#[derive(Clone)]
pub struct TelegramTransport {
    bot: Bot,
    chat_id: ChatId,
    chunk_max: usize,
}

impl TelegramTransport {
    pub fn new(bot: Bot, chat_id: ChatId, chunk_max: usize) -> Self {
        Self {
            bot,
            chat_id,
            chunk_max,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// Send `chunks` in order; the keyboard rides on the last one.
    async fn send_chunks(
        &self,
        chunks: &[String],
        keyboard: Option<&Keyboard>,
    ) -> Result<Option<MessageId>, TransportError> {
        let mut last_id = None;
        for (i, chunk) in chunks.iter().enumerate() {
            if i > 0 {
                tokio::time::sleep(CHUNK_DELAY).await;
            }
            let mut req = self.bot.send_message(self.chat_id, chunk);
            if i + 1 == chunks.len() {
                if let Some(k) = keyboard {
                    req = req.reply_markup(markup(k));
                }
            }
            let sent = req.await.map_err(request_error)?;
            last_id = Some(sent.id);
        }
        Ok(last_id)
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send(
        &self,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<MessageRef, TransportError> {
        let chunks = split_chunks_smart(text, self.chunk_max);
        self.send_chunks(&chunks, keyboard)
            .await?
            .map(|id| MessageRef(id.0))
            .ok_or_else(|| TransportError("nothing was sent".to_string()))
    }

    async fn edit(
        &self,
        message: MessageRef,
        text: &str,
        keyboard: Option<&Keyboard>,
    ) -> Result<(), TransportError> {
        let chunks = split_chunks_smart(text, self.chunk_max);
        let Some((first, rest)) = chunks.split_first() else {
            return Ok(());
        };

        let mut req = self
            .bot
            .edit_message_text(self.chat_id, MessageId(message.0), first);
        if rest.is_empty() {
            if let Some(k) = keyboard {
                req = req.reply_markup(markup(k));
            }
        }
        match req.await {
            Ok(_) => {}
            Err(RequestError::Api(ApiError::MessageNotModified)) => {
                debug!(message_id = message.0, "Telegram: edit left message unchanged");
            }
            Err(e) => return Err(request_error(e)),
        }

        self.send_chunks(rest, keyboard).await?;
        Ok(())
    }

    async fn delete(&self, message: MessageRef) -> Result<(), TransportError> {
        self.bot
            .delete_message(self.chat_id, MessageId(message.0))
            .await
            .map(|_| ())
            .map_err(request_error)
    }

    async fn fetch_media(&self, file_id: &str) -> Result<Vec<u8>, TransportError> {
        let file = self.bot.get_file(file_id).await.map_err(request_error)?;

        let mut buf: Vec<u8> = Vec::new();
        self.bot
            .download_file(&file.path, &mut buf)
            .await
            .map_err(|e| TransportError(format!("download failed: {e}")))?;

        debug!(file_id, bytes = buf.len(), "Telegram: media downloaded");
        Ok(buf)
    }
}

fn request_error(e: RequestError) -> TransportError {
    TransportError(e.to_string())
}

/// Inline keyboard markup with one callback button per [`Keyboard`] button.
fn markup(keyboard: &Keyboard) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(keyboard.rows.iter().map(|row| {
        row.iter()
            .map(|b| InlineKeyboardButton::callback(b.label.clone(), b.action.clone()))
            .collect::<Vec<_>>()
    }))
}

#[cfg(test)]
mod tests {
    use teloxide::types::InlineKeyboardButtonKind;

    use enhancer_agent::pipeline::Button;

    use super::*;

    #[test]
    fn keyboard_maps_to_callback_buttons() {
        let keyboard = Keyboard::column([
            Button::new("🔤 Improve grammar", "enhance:grammar:5"),
            Button::new("🔙 Back", "back_to_main"),
        ]);
        let m = markup(&keyboard);

        assert_eq!(m.inline_keyboard.len(), 2);
        assert_eq!(m.inline_keyboard[0].len(), 1);
        let first = &m.inline_keyboard[0][0];
        assert_eq!(first.text, "🔤 Improve grammar");
        assert_eq!(
            first.kind,
            InlineKeyboardButtonKind::CallbackData("enhance:grammar:5".into())
        );
    }

    #[test]
    fn empty_keyboard_has_no_rows() {
        assert!(markup(&Keyboard::default()).inline_keyboard.is_empty());
    }
}
