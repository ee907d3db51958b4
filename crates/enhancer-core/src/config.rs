use figment::{
    providers::{Env, Format, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const DEFAULT_CONFIG_PATH: &str = "enhancer.toml";
pub const DEFAULT_STORAGE_PATH: &str = "data/users.json";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_MODEL: &str = "gpt-4o";
pub const DEFAULT_TRANSCRIPTION_MODEL: &str = "whisper-1";
pub const DEFAULT_LANGUAGE: &str = "ru";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_MAX_MESSAGE_LENGTH: usize = 4096;
/// Telegram's per-message ceiling. `max_message_length` may not exceed it.
pub const TELEGRAM_MESSAGE_LIMIT: usize = 4096;
pub const DEFAULT_MAX_VOICE_DURATION_SECS: u32 = 60;
pub const DEFAULT_MAX_CUSTOM_ENHANCERS: usize = 3;

/// Plain environment variables accepted alongside the `ENHANCER_` prefix,
/// with the config path each one lands on.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("TELEGRAM_TOKEN", "telegram.bot_token"),
    ("OPENAI_API_KEY", "openai.api_key"),
    ("OPENAI_MODEL", "openai.model"),
    ("MAX_MESSAGE_LENGTH", "limits.max_message_length"),
    ("MAX_AUDIO_DURATION", "limits.max_voice_duration_secs"),
    ("MAX_CUSTOM_ENHANCERS", "limits.max_custom_enhancers"),
];

/// Top-level config (enhancer.toml + ENHANCER_* env overrides).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnhancerConfig {
    #[serde(default)]
    pub telegram: TelegramConfig,
    #[serde(default)]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub limits: LimitsConfig,
    #[serde(default)]
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TelegramConfig {
    #[serde(default)]
    pub bot_token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
    /// Chat model used for classification and rewriting.
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_transcription_model")]
    pub transcription_model: String,
    /// ISO-639-1 hint passed to the transcription endpoint. `None` lets it auto-detect.
    #[serde(default = "default_language")]
    pub transcription_language: Option<String>,
    /// Upper bound for every outbound HTTP call (classification, rewriting, transcription).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: default_openai_base_url(),
            model: default_model(),
            transcription_model: default_transcription_model(),
            transcription_language: default_language(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsConfig {
    /// Largest outgoing message, in UTF-8 bytes. Bytes never undercount what
    /// Telegram measures, so a text within this budget is sent unsplit.
    #[serde(default = "default_max_message_length")]
    pub max_message_length: usize,
    /// Voice clips longer than this are rejected before download.
    #[serde(default = "default_max_voice_duration_secs")]
    pub max_voice_duration_secs: u32,
    #[serde(default = "default_max_custom_enhancers")]
    pub max_custom_enhancers: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_length: DEFAULT_MAX_MESSAGE_LENGTH,
            max_voice_duration_secs: DEFAULT_MAX_VOICE_DURATION_SECS,
            max_custom_enhancers: DEFAULT_MAX_CUSTOM_ENHANCERS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// JSON document holding every user profile.
    #[serde(default = "default_storage_path")]
    pub path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
        }
    }
}

fn default_openai_base_url() -> String {
    DEFAULT_OPENAI_BASE_URL.to_string()
}
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_transcription_model() -> String {
    DEFAULT_TRANSCRIPTION_MODEL.to_string()
}
fn default_language() -> Option<String> {
    Some(DEFAULT_LANGUAGE.to_string())
}
fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}
fn default_max_message_length() -> usize {
    DEFAULT_MAX_MESSAGE_LENGTH
}
fn default_max_voice_duration_secs() -> u32 {
    DEFAULT_MAX_VOICE_DURATION_SECS
}
fn default_max_custom_enhancers() -> usize {
    DEFAULT_MAX_CUSTOM_ENHANCERS
}
fn default_storage_path() -> String {
    DEFAULT_STORAGE_PATH.to_string()
}

impl EnhancerConfig {
    /// Load config from a TOML file, then plain legacy env vars, then
    /// `ENHANCER_*` overrides (`__` separates nested keys).
    ///
    /// A missing file is not an error; every field has a default except the
    /// credentials, which [`EnhancerConfig::validate`] checks.
    pub fn load(config_path: Option<&str>) -> crate::error::Result<Self> {
        let path = config_path.unwrap_or(DEFAULT_CONFIG_PATH);
        debug!(path, exists = std::path::Path::new(path).exists(), "loading configuration");
        Self::figment(path)
            .extract()
            .map_err(|e| crate::error::EnhancerError::Config(e.to_string()))
    }

    fn figment(path: &str) -> Figment {
        Figment::new()
            .merge(Toml::file(path))
            .merge(
                Env::raw()
                    .only(&LEGACY_ENV.iter().map(|(k, _)| *k).collect::<Vec<_>>())
                    .map(|key| legacy_key(key.as_str()).into()),
            )
            .merge(Env::prefixed("ENHANCER_").split("__"))
    }

    /// Reject configs that cannot talk to either external service.
    pub fn validate(&self) -> crate::error::Result<()> {
        if self.telegram.bot_token.trim().is_empty() {
            return Err(crate::error::EnhancerError::Config(
                "telegram.bot_token is not set (TELEGRAM_TOKEN)".to_string(),
            ));
        }
        if self.openai.api_key.trim().is_empty() {
            return Err(crate::error::EnhancerError::Config(
                "openai.api_key is not set (OPENAI_API_KEY)".to_string(),
            ));
        }
        let len = self.limits.max_message_length;
        if len == 0 || len > TELEGRAM_MESSAGE_LIMIT {
            return Err(crate::error::EnhancerError::Config(format!(
                "limits.max_message_length must be between 1 and {TELEGRAM_MESSAGE_LIMIT}, got {len}"
            )));
        }
        if self.limits.max_custom_enhancers == 0 {
            return Err(crate::error::EnhancerError::Config(
                "limits.max_custom_enhancers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn legacy_key(env_key: &str) -> String {
    LEGACY_ENV
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(env_key))
        .map(|(_, path)| path.to_string())
        .unwrap_or_else(|| env_key.to_lowercase())
}
