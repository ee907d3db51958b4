//! Inline-button handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::debug;

use enhancer_agent::pipeline::{DisplayedMessage, EnhancerContext, InboundEvent, MessageRef};

use crate::adapter::AdapterSettings;
use crate::handler::deliver;
use crate::transport::TelegramTransport;

/// Runs for every `CallbackQuery`. The query is acknowledged first so the
/// client stops its spinner even if handling takes a while.
pub async fn handle_callback<C: EnhancerContext + 'static>(
    bot: Bot,
    q: CallbackQuery,
    ctx: Arc<C>,
    settings: AdapterSettings,
) -> ResponseResult<()> {
    if let Err(e) = bot.answer_callback_query(q.id.clone()).await {
        debug!(error = %e, "Telegram: answer_callback_query failed");
    }

    let Some(token) = q.data.clone() else {
        return Ok(());
    };
    let user_id = q.from.id.0 as i64;

    // Inaccessible (too old) messages carry no text; the router then
    // answers with a fresh message in the user's private chat.
    let (chat_id, displayed) = match q.regular_message() {
        Some(m) => (
            m.chat.id,
            m.text().map(|text| DisplayedMessage {
                message: MessageRef(m.id.0),
                text: text.to_string(),
            }),
        ),
        None => (ChatId::from(q.from.id), None),
    };

    let transport = TelegramTransport::new(bot, chat_id, settings.chunk_max);
    deliver(
        ctx.as_ref(),
        &transport,
        InboundEvent::Action {
            user_id,
            token,
            displayed,
        },
    )
    .await;
    Ok(())
}
