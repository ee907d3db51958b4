//! Interaction router. Turns inbound events into transport calls.
//!
//! There is no server-side session table. Pending text travels inside the
//! menu message (see [`pending`](crate::pipeline::pending)) and is recovered
//! from it when a button is pressed.

use tracing::{debug, info, warn};

use enhancer_core::types::{EnhancementKind, EnhancementResult};
use enhancer_core::EnhancerError;

use crate::dispatcher::Enhancement;
use crate::pipeline::action::Action;
use crate::pipeline::commands::{parse_add_enhancer, Command};
use crate::pipeline::context::EnhancerContext;
use crate::pipeline::pending::{extract_pending, render_pending, PendingSource};
use crate::pipeline::render;
use crate::pipeline::transport::{MessageRef, Transport, TransportError};

/// The message a button was attached to, as the platform echoes it back.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayedMessage {
    pub message: MessageRef,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Text {
        user_id: i64,
        text: String,
    },
    Voice {
        user_id: i64,
        file_id: String,
        duration_secs: u32,
    },
    Command {
        user_id: i64,
        command: Command,
    },
    Action {
        user_id: i64,
        token: String,
        displayed: Option<DisplayedMessage>,
    },
}

/// Handle one inbound event.
///
/// Collaborator failures are reported to the user in place and do not
/// surface here; only failures to talk to the transport itself do.
pub async fn route<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    event: InboundEvent,
) -> Result<(), TransportError> {
    match event {
        InboundEvent::Text { user_id, text } => handle_text(ctx, transport, user_id, &text).await,
        InboundEvent::Voice {
            user_id,
            file_id,
            duration_secs,
        } => handle_voice(ctx, transport, user_id, &file_id, duration_secs).await,
        InboundEvent::Command { user_id, command } => {
            handle_command(ctx, transport, user_id, command).await
        }
        InboundEvent::Action {
            user_id,
            token,
            displayed,
        } => handle_action(ctx, transport, user_id, &token, displayed).await,
    }
}

pub async fn handle_text<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    user_id: i64,
    text: &str,
) -> Result<(), TransportError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }
    info!(user_id, chars = text.chars().count(), "text received");
    present_pending(ctx, transport, user_id, PendingSource::Typed, text).await?;
    Ok(())
}

pub async fn handle_voice<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    user_id: i64,
    file_id: &str,
    duration_secs: u32,
) -> Result<(), TransportError> {
    let max = ctx.limits().max_voice_duration_secs;
    if duration_secs > max {
        info!(user_id, duration_secs, max, "voice message too long, rejected");
        transport.send(&render::voice_too_long(max), None).await?;
        return Ok(());
    }

    info!(user_id, duration_secs, "voice received");
    let placeholder = transport.send(render::PROCESSING_VOICE, None).await?;

    let text = match transcribe_clip(ctx, transport, file_id).await {
        Ok(text) => text,
        Err(e) => {
            log_failure(user_id, &e, "voice processing failed");
            return transport.edit(placeholder, &render::error(&e), None).await;
        }
    };

    match present_pending(ctx, transport, user_id, PendingSource::Voice, &text).await {
        Ok(_) => {
            if let Err(e) = transport.delete(placeholder).await {
                debug!(error = %e, "failed to delete voice placeholder");
            }
            Ok(())
        }
        Err(e) => {
            let e = EnhancerError::from(e);
            log_failure(user_id, &e, "voice menu not delivered");
            transport.edit(placeholder, &render::error(&e), None).await
        }
    }
}

pub async fn handle_command<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    user_id: i64,
    command: Command,
) -> Result<(), TransportError> {
    debug!(user_id, ?command, "command received");
    match command {
        Command::Start => {
            transport.send(&render::start_text(), None).await?;
        }
        Command::Help => {
            transport.send(&render::help_text(ctx.limits()), None).await?;
        }
        Command::Settings => {
            let enhancers = ctx.registry().list_enhancers(user_id);
            let (text, keyboard) = render::settings(&enhancers, ctx.registry().max_enhancers());
            transport.send(&text, Some(&keyboard)).await?;
        }
        Command::AddEnhancer(args) => {
            let reply = match parse_add_enhancer(&args) {
                Err(e) => render::add_enhancer_invalid(&e.to_string()),
                Ok(new) => match ctx.registry().add_enhancer(
                    user_id,
                    &new.name,
                    &new.prompt,
                    new.description.as_deref(),
                ) {
                    Ok(created) => render::enhancer_added(&created.name),
                    Err(e) => render::error(&EnhancerError::from(e)),
                },
            };
            transport.send(&reply, None).await?;
        }
    }
    Ok(())
}

pub async fn handle_action<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    user_id: i64,
    token: &str,
    displayed: Option<DisplayedMessage>,
) -> Result<(), TransportError> {
    let action = match Action::parse(token) {
        Ok(a) => a,
        Err(e) => {
            debug!(user_id, error = %e, "ignoring unknown action");
            return Ok(());
        }
    };
    debug!(user_id, %action, "action received");

    match action {
        Action::Enhance {
            kind,
            user_id: owner,
            enhancer_id,
        } => handle_enhance(ctx, transport, owner, kind, enhancer_id.as_deref(), displayed).await,
        Action::AddEnhancer => {
            reply_in_place(transport, displayed.as_ref(), &render::add_enhancer_usage()).await
        }
        Action::RemoveEnhancer { id } => {
            let removed = ctx.registry().remove_enhancer(user_id, &id);
            reply_in_place(transport, displayed.as_ref(), &render::enhancer_removed(removed)).await
        }
        Action::BackToMain => {
            reply_in_place(transport, displayed.as_ref(), &render::main_menu_text()).await
        }
    }
}

/// Resolve a menu selection: recover the pending text, run the enhancement
/// behind a placeholder, and replace the placeholder with the outcome.
async fn handle_enhance<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    owner: i64,
    kind: EnhancementKind,
    enhancer_id: Option<&str>,
    displayed: Option<DisplayedMessage>,
) -> Result<(), TransportError> {
    let extracted = displayed
        .as_ref()
        .ok_or(EnhancerError::ExtractionFailure(
            "button has no message attached".to_string(),
        ))
        .and_then(|d| extract_pending(&d.text).map_err(EnhancerError::from));

    let text = match extracted {
        Ok(text) => text,
        Err(e) => {
            log_failure(owner, &e, "pending text extraction failed");
            return reply_in_place(transport, displayed.as_ref(), &render::error(&e)).await;
        }
    };

    let placeholder = transport.send(render::ENHANCING, None).await?;

    let reply = match run_enhancement(ctx, owner, kind, enhancer_id, &text).await {
        Ok((result, custom_name)) => render::result(&result, custom_name.as_deref()),
        Err(e) => {
            log_failure(owner, &e, "enhancement failed");
            render::error(&e)
        }
    };
    transport.edit(placeholder, &reply, None).await
}

async fn run_enhancement<C: EnhancerContext>(
    ctx: &C,
    owner: i64,
    kind: EnhancementKind,
    enhancer_id: Option<&str>,
    text: &str,
) -> Result<(EnhancementResult, Option<String>), EnhancerError> {
    let (enhancement, custom_name) = match kind {
        EnhancementKind::Custom => {
            let id = enhancer_id.ok_or_else(|| {
                EnhancerError::InvalidEnhancement("no custom enhancer selected".to_string())
            })?;
            let custom = ctx.registry().get_enhancer(owner, id).ok_or_else(|| {
                EnhancerError::InvalidEnhancement("custom enhancer not found".to_string())
            })?;
            let enhancement = Enhancement::resolve(kind, Some(&custom.prompt))?;
            (enhancement, Some(custom.name))
        }
        builtin => (Enhancement::resolve(builtin, None)?, None),
    };

    let result = ctx.dispatcher().enhance_with(text, &enhancement).await?;
    Ok((result, custom_name))
}

/// Show `text` plus the enhancement menu as a new message.
///
/// The length check counts bytes, the same measure the transport splits
/// by, so an accepted menu always goes out as one message and its text can
/// be recovered on a button press.
async fn present_pending<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    user_id: i64,
    source: PendingSource,
    text: &str,
) -> Result<MessageRef, TransportError> {
    let shown = render_pending(source, text);
    let max = ctx.limits().max_message_length;
    if shown.len() > max {
        info!(user_id, bytes = shown.len(), max, "pending text too long");
        return transport.send(&render::text_too_long(max), None).await;
    }

    let content = ctx.dispatcher().classify(text).await;
    let enhancers = ctx.registry().list_enhancers(user_id);
    let menu = render::enhancement_menu(user_id, content, &enhancers);
    transport.send(&shown, Some(&menu)).await
}

async fn transcribe_clip<C: EnhancerContext, T: Transport>(
    ctx: &C,
    transport: &T,
    file_id: &str,
) -> Result<String, EnhancerError> {
    let audio = transport.fetch_media(file_id).await?;
    let text = ctx.transcriber().transcribe(&audio).await?;
    if text.trim().is_empty() {
        return Err(EnhancerError::CollaboratorFailure {
            service: "transcription".to_string(),
            reason: "no speech recognized".to_string(),
        });
    }
    Ok(text)
}

/// User-recoverable failures (bad input, full list) are routine; the rest
/// point at a collaborator and are logged louder.
fn log_failure(user_id: i64, e: &EnhancerError, what: &str) {
    if e.is_user_recoverable() {
        info!(user_id, code = e.code(), error = %e, "{what}");
    } else {
        warn!(user_id, code = e.code(), error = %e, "{what}");
    }
}

/// Edit the message the button belongs to, or send a new one if the
/// platform did not include it.
async fn reply_in_place<T: Transport>(
    transport: &T,
    displayed: Option<&DisplayedMessage>,
    text: &str,
) -> Result<(), TransportError> {
    match displayed {
        Some(d) => transport.edit(d.message, text, None).await,
        None => transport.send(text, None).await.map(|_| ()),
    }
}
