use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use enhancer_agent::{Dispatcher, OpenAiProvider, WhisperTranscriber};
use enhancer_core::config::{EnhancerConfig, DEFAULT_CONFIG_PATH};
use enhancer_telegram::TelegramAdapter;
use enhancer_users::EnhancerRegistry;

mod app;

#[derive(Parser)]
#[command(name = "enhancer-bot")]
#[command(about = "Telegram bot that rewrites texts, prompts and voice notes with an LLM")]
struct Cli {
    /// Path to the TOML config file. Falls back to $ENHANCER_CONFIG, then ./enhancer.toml
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "enhancer_bot=info,enhancer_telegram=info,enhancer_agent=info,enhancer_users=info"
                    .into()
            }),
        )
        .init();

    let cli = Cli::parse();

    // config: --config > ENHANCER_CONFIG env > ./enhancer.toml; env vars override file values
    let config_path = cli
        .config
        .or_else(|| std::env::var("ENHANCER_CONFIG").ok())
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = EnhancerConfig::load(Some(&config_path))
        .with_context(|| format!("failed to load config from {config_path}"))?;
    config.validate().context("invalid configuration")?;

    info!(
        path = %config_path,
        model = %config.openai.model,
        storage = %config.storage.path,
        "configuration loaded"
    );

    let timeout = Duration::from_secs(config.openai.request_timeout_secs);

    let provider = OpenAiProvider::new(
        config.openai.api_key.clone(),
        Some(config.openai.base_url.clone()),
        timeout,
    );
    let dispatcher = Dispatcher::new(Arc::new(provider), config.openai.model.clone());

    let transcriber = WhisperTranscriber::new(
        config.openai.api_key.clone(),
        Some(config.openai.base_url.clone()),
        config.openai.transcription_model.clone(),
        config.openai.transcription_language.clone(),
        timeout,
    );

    let registry = EnhancerRegistry::open(
        &config.storage.path,
        config.limits.max_custom_enhancers,
    );

    let telegram = config.telegram.clone();
    let max_message_length = config.limits.max_message_length;
    let state = Arc::new(app::AppState::new(config, registry, dispatcher, transcriber));

    let adapter = TelegramAdapter::new(&telegram, state, max_message_length)?;
    adapter.run().await?;

    info!("shutting down");
    Ok(())
}
