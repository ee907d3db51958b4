//! Telegram message handler registered in the teloxide Dispatcher.

use std::sync::Arc;

use teloxide::prelude::*;
use tracing::{debug, warn};

use enhancer_agent::pipeline::{render, route, Command, EnhancerContext, InboundEvent, Transport};

use crate::adapter::AdapterSettings;
use crate::transport::TelegramTransport;

/// Runs for every incoming `Message`:
/// 1. Bot-message filter
/// 2. Voice / command / free-text classification
/// 3. Router invocation over a per-chat transport
pub async fn handle_message<C: EnhancerContext + 'static>(
    bot: Bot,
    msg: Message,
    ctx: Arc<C>,
    settings: AdapterSettings,
) -> ResponseResult<()> {
    let from = match msg.from.as_ref() {
        Some(u) if !u.is_bot => u,
        _ => return Ok(()),
    };
    let user_id = from.id.0 as i64;

    let Some(event) = inbound_event(user_id, &msg) else {
        return Ok(());
    };

    let transport = TelegramTransport::new(bot, msg.chat.id, settings.chunk_max);
    deliver(ctx.as_ref(), &transport, event).await;
    Ok(())
}

/// Map a Telegram message onto a router event. Messages that are neither
/// voice nor text (stickers, photos, ...) yield `None`.
fn inbound_event(user_id: i64, msg: &Message) -> Option<InboundEvent> {
    if let Some(voice) = msg.voice() {
        return Some(InboundEvent::Voice {
            user_id,
            file_id: voice.file.id.clone(),
            duration_secs: voice.duration.seconds(),
        });
    }

    let text = msg.text()?;
    Some(text_event(user_id, text))
}

/// Known slash commands become commands; anything else, including unknown
/// `/words`, is text to enhance.
fn text_event(user_id: i64, text: &str) -> InboundEvent {
    match Command::parse(text) {
        Some(command) => InboundEvent::Command { user_id, command },
        None => InboundEvent::Text {
            user_id,
            text: text.to_string(),
        },
    }
}

/// Route one event. A transport failure is logged and answered with a
/// generic message when the chat is still reachable.
pub(crate) async fn deliver<C: EnhancerContext>(
    ctx: &C,
    transport: &TelegramTransport,
    event: InboundEvent,
) {
    if let Err(e) = route(ctx, transport, event).await {
        warn!(chat_id = %transport.chat_id(), error = %e, "Telegram: failed to handle update");
        if let Err(e) = transport.send(render::GENERIC_FAILURE, None).await {
            debug!(error = %e, "Telegram: failure notice not delivered");
        }
    }
}
