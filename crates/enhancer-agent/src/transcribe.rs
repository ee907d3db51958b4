//! Voice transcription: converts Telegram voice notes (OGG/Opus) to text.
//!
//! The OpenAI Whisper API is the only backend; tests substitute their own
//! [`SpeechToText`] implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::openai::build_client;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptionError {
    #[error("Whisper API request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Whisper API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Whisper response parse error: {0}")]
    Parse(String),
}

/// Speech-to-text collaborator.
#[async_trait]
pub trait SpeechToText: Send + Sync {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError>;
}

pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    language: Option<String>,
}

impl WhisperTranscriber {
    pub fn new(
        api_key: String,
        base_url: Option<String>,
        model: String,
        language: Option<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client: build_client(timeout),
            api_key,
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| "https://api.openai.com".to_string()),
            model,
            language,
        }
    }
}

#[async_trait]
impl SpeechToText for WhisperTranscriber {
    async fn transcribe(&self, audio: &[u8]) -> Result<String, TranscriptionError> {
        let part = reqwest::multipart::Part::bytes(audio.to_vec())
            .file_name("audio.ogg")
            .mime_str("audio/ogg")?;

        let mut form = reqwest::multipart::Form::new()
            .text("model", self.model.clone())
            .part("file", part);
        if let Some(lang) = &self.language {
            form = form.text("language", lang.clone());
        }

        debug!(bytes = audio.len(), model = %self.model, "sending audio to Whisper");

        let resp = self
            .client
            .post(format!("{}/v1/audio/transcriptions", self.base_url))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(status, body = %body, "Whisper API error");
            return Err(TranscriptionError::Api {
                status,
                message: body,
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| TranscriptionError::Parse(e.to_string()))?;
        json["text"]
            .as_str()
            .map(|s| s.trim().to_string())
            .ok_or_else(|| TranscriptionError::Parse("no 'text' field in response".to_string()))
    }
}

impl From<TranscriptionError> for enhancer_core::EnhancerError {
    fn from(e: TranscriptionError) -> Self {
        enhancer_core::EnhancerError::CollaboratorFailure {
            service: "transcription".to_string(),
            reason: e.to_string(),
        }
    }
}
