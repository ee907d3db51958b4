//! Telegram channel adapter.
//!
//! Wraps a teloxide `Bot` + `Dispatcher` and drives the long-polling event loop
//! until the process is interrupted. Messages and button presses are both
//! turned into router events; nothing here knows about enhancements.

use std::sync::Arc;

use teloxide::prelude::*;
use teloxide::types::BotCommand;
use tracing::{info, warn};

use enhancer_agent::pipeline::{EnhancerContext, COMMANDS};
use enhancer_core::config::TelegramConfig;

use crate::callback::handle_callback;
use crate::error::TelegramError;
use crate::handler::handle_message;

/// Per-adapter settings injected into every handler.
#[derive(Debug, Clone)]
pub struct AdapterSettings {
    /// Longest text sent in a single Telegram message.
    pub chunk_max: usize,
}

pub struct TelegramAdapter<C: EnhancerContext + 'static> {
    ctx: Arc<C>,
    bot_token: String,
    settings: AdapterSettings,
}

impl<C: EnhancerContext + 'static> TelegramAdapter<C> {
    pub fn new(
        config: &TelegramConfig,
        ctx: Arc<C>,
        max_message_length: usize,
    ) -> Result<Self, TelegramError> {
        Ok(Self {
            ctx,
            bot_token: bot_token(config)?,
            settings: AdapterSettings {
                chunk_max: max_message_length,
            },
        })
    }

    /// Connect to Telegram and drive the long-polling loop.
    ///
    /// Returns once the dispatcher shuts down (Ctrl-C), or early if the
    /// token is rejected.
    pub async fn run(self) -> Result<(), TelegramError> {
        let bot = Bot::new(&self.bot_token);

        let me = bot.get_me().await?;
        info!(
            username = me.user.username.as_deref().unwrap_or(""),
            "Telegram: authenticated"
        );

        register_commands(&bot).await;

        info!("Telegram: starting long-polling dispatcher");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(handle_message::<C>))
            .branch(Update::filter_callback_query().endpoint(handle_callback::<C>));

        Dispatcher::builder(bot, handler)
            .dependencies(dptree::deps![self.ctx, self.settings])
            .default_handler(|_upd| async {})
            .enable_ctrlc_handler()
            .build()
            .dispatch()
            .await;

        info!("Telegram: dispatcher stopped");
        Ok(())
    }
}

fn bot_token(config: &TelegramConfig) -> Result<String, TelegramError> {
    let token = config.bot_token.trim();
    if token.is_empty() {
        return Err(TelegramError::NoToken);
    }
    Ok(token.to_string())
}

/// Publish the command menu. Failure only costs the menu, so it is logged.
async fn register_commands(bot: &Bot) {
    let commands: Vec<BotCommand> = COMMANDS
        .iter()
        .map(|(name, description)| BotCommand::new(*name, *description))
        .collect();
    let count = commands.len();

    match bot.set_my_commands(commands).await {
        Ok(_) => info!(count, "Telegram: bot commands registered"),
        Err(e) => warn!(error = %e, "Telegram: failed to register bot commands"),
    }
}
