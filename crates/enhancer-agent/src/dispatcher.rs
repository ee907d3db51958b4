//! Enhancement dispatcher: resolves an instruction and calls the provider.

use std::sync::Arc;

use tracing::{debug, info, warn};

use enhancer_core::types::{ContentType, EnhancementKind, EnhancementResult};
use enhancer_core::EnhancerError;

use crate::prompt;
use crate::provider::{ChatRequest, LlmProvider, Message, ProviderError};

/// A fully resolved enhancement. A custom enhancement always carries its
/// instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enhancement {
    Grammar,
    PromptEnhancement,
    Custom { prompt: String },
}

impl Enhancement {
    /// Build from a kind plus the optional custom instruction. `Custom`
    /// without a non-blank instruction is rejected.
    pub fn resolve(
        kind: EnhancementKind,
        custom_prompt: Option<&str>,
    ) -> Result<Self, DispatchError> {
        match kind {
            EnhancementKind::Grammar => Ok(Enhancement::Grammar),
            EnhancementKind::PromptEnhancement => Ok(Enhancement::PromptEnhancement),
            EnhancementKind::Custom => match custom_prompt {
                Some(p) if !p.trim().is_empty() => Ok(Enhancement::Custom {
                    prompt: p.to_string(),
                }),
                _ => Err(DispatchError::InvalidEnhancement(
                    "custom enhancement requires a prompt".to_string(),
                )),
            },
        }
    }

    pub fn kind(&self) -> EnhancementKind {
        match self {
            Enhancement::Grammar => EnhancementKind::Grammar,
            Enhancement::PromptEnhancement => EnhancementKind::PromptEnhancement,
            Enhancement::Custom { .. } => EnhancementKind::Custom,
        }
    }

    /// System instruction sent to the provider.
    pub fn instruction(&self) -> &str {
        match self {
            Enhancement::Grammar => prompt::GRAMMAR_INSTRUCTION,
            Enhancement::PromptEnhancement => prompt::PROMPT_ENHANCEMENT_INSTRUCTION,
            Enhancement::Custom { prompt } => prompt,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("invalid enhancement: {0}")]
    InvalidEnhancement(String),

    #[error("enhancement failed: {0}")]
    EnhancementFailed(#[from] ProviderError),
}

impl From<DispatchError> for EnhancerError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::InvalidEnhancement(msg) => EnhancerError::InvalidEnhancement(msg),
            DispatchError::EnhancementFailed(e) => EnhancerError::CollaboratorFailure {
                service: "text rewriting".to_string(),
                reason: e.to_string(),
            },
        }
    }
}

/// Stateless front door to the rewriting provider. Cheap to share: holds
/// only the provider handle and the model name.
pub struct Dispatcher {
    provider: Arc<dyn LlmProvider>,
    model: String,
}

impl Dispatcher {
    pub fn new(provider: Arc<dyn LlmProvider>, model: String) -> Self {
        Self { provider, model }
    }

    /// Guess whether `text` is an AI prompt or ordinary text.
    ///
    /// Only orders the menu, so any provider failure degrades to
    /// [`ContentType::Text`] instead of surfacing.
    pub async fn classify(&self, text: &str) -> ContentType {
        let req = self.request(
            prompt::CLASSIFY_INSTRUCTION,
            text,
            prompt::CLASSIFY_MAX_TOKENS,
            prompt::CLASSIFY_TEMPERATURE,
        );
        match self.provider.send(&req).await {
            Ok(resp) => ContentType::from_reply(&resp.content),
            Err(e) => {
                debug!(error = %e, provider = %self.provider.name(), "classification failed, assuming text");
                ContentType::Text
            }
        }
    }

    /// Rewrite `text` under `kind`. `custom_prompt` is required for
    /// [`EnhancementKind::Custom`] and ignored otherwise.
    pub async fn enhance(
        &self,
        text: &str,
        kind: EnhancementKind,
        custom_prompt: Option<&str>,
    ) -> Result<EnhancementResult, DispatchError> {
        let enhancement = Enhancement::resolve(kind, custom_prompt)?;
        self.enhance_with(text, &enhancement).await
    }

    pub async fn enhance_with(
        &self,
        text: &str,
        enhancement: &Enhancement,
    ) -> Result<EnhancementResult, DispatchError> {
        let req = self.request(
            enhancement.instruction(),
            text,
            prompt::ENHANCE_MAX_TOKENS,
            prompt::ENHANCE_TEMPERATURE,
        );

        info!(
            kind = %enhancement.kind(),
            model = %req.model,
            provider = %self.provider.name(),
            chars = text.chars().count(),
            "enhancing text"
        );

        let resp = self.provider.send(&req).await.map_err(|e| {
            warn!(error = %e, kind = %enhancement.kind(), "enhancement request failed");
            DispatchError::EnhancementFailed(e)
        })?;

        Ok(EnhancementResult {
            original_text: text.to_string(),
            enhanced_text: resp.content.trim().to_string(),
            kind: enhancement.kind(),
            changes_summary: None,
        })
    }

    fn request(&self, system: &str, text: &str, max_tokens: u32, temperature: f32) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            system: system.to_string(),
            messages: vec![Message::user(text)],
            max_tokens,
            temperature: Some(temperature),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::provider::ChatResponse;

    /// Records every request; replies with `reply` or fails when `None`.
    struct ScriptedProvider {
        reply: Option<String>,
        seen: Mutex<Vec<ChatRequest>>,
    }

    impl ScriptedProvider {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                reply: Some(reply.to_string()),
                seen: Mutex::new(Vec::new()),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                reply: None,
                seen: Mutex::new(Vec::new()),
            })
        }

        fn last_system(&self) -> String {
            self.seen.lock().unwrap().last().unwrap().system.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn send(&self, req: &ChatRequest) -> Result<ChatResponse, ProviderError> {
            self.seen.lock().unwrap().push(req.clone());
            match &self.reply {
                Some(r) => Ok(ChatResponse {
                    content: r.clone(),
                    model: req.model.clone(),
                    tokens_in: 1,
                    tokens_out: 1,
                    stop_reason: "stop".into(),
                }),
                None => Err(ProviderError::Unavailable("down".into())),
            }
        }
    }

    fn dispatcher(p: Arc<ScriptedProvider>) -> Dispatcher {
        Dispatcher::new(p, "gpt-4o".into())
    }

    #[tokio::test]
    async fn classify_reads_prompt_reply() {
        let d = dispatcher(ScriptedProvider::replying(" Prompt \n"));
        assert_eq!(d.classify("write a function").await, ContentType::Prompt);
    }

    #[tokio::test]
    async fn classify_falls_back_to_text_on_error() {
        let p = ScriptedProvider::failing();
        let d = dispatcher(p.clone());
        for input in ["", "hello", "create a REST API in Rust", "🤖"] {
            assert_eq!(d.classify(input).await, ContentType::Text);
        }
        assert_eq!(p.seen.lock().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn classify_uses_small_budget() {
        let p = ScriptedProvider::replying("text");
        let d = dispatcher(p.clone());
        d.classify("hi").await;
        let req = p.seen.lock().unwrap()[0].clone();
        assert_eq!(req.max_tokens, 10);
        assert_eq!(req.temperature, Some(0.1));
        assert_eq!(req.system, prompt::CLASSIFY_INSTRUCTION);
    }

    #[tokio::test]
    async fn custom_without_prompt_is_invalid() {
        let p = ScriptedProvider::replying("x");
        let d = dispatcher(p.clone());
        for missing in [None, Some(""), Some("   ")] {
            let err = d
                .enhance("text", EnhancementKind::Custom, missing)
                .await
                .unwrap_err();
            assert!(matches!(err, DispatchError::InvalidEnhancement(_)));
        }
        assert!(p.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn custom_prompt_is_sent_verbatim() {
        let p = ScriptedProvider::replying("done");
        let d = dispatcher(p.clone());
        let result = d
            .enhance("text", EnhancementKind::Custom, Some("X"))
            .await
            .unwrap();
        assert_eq!(p.last_system(), "X");
        assert_eq!(result.kind, EnhancementKind::Custom);
    }

    #[tokio::test]
    async fn builtin_kinds_use_fixed_templates() {
        let p = ScriptedProvider::replying("  Улучшенный текст \n");
        let d = dispatcher(p.clone());

        let r = d
            .enhance("тест текст", EnhancementKind::Grammar, Some("ignored"))
            .await
            .unwrap();
        assert_eq!(p.last_system(), prompt::GRAMMAR_INSTRUCTION);
        assert_eq!(
            r,
            EnhancementResult {
                original_text: "тест текст".into(),
                enhanced_text: "Улучшенный текст".into(),
                kind: EnhancementKind::Grammar,
                changes_summary: None,
            }
        );

        d.enhance("тест промпт", EnhancementKind::PromptEnhancement, None)
            .await
            .unwrap();
        assert_eq!(p.last_system(), prompt::PROMPT_ENHANCEMENT_INSTRUCTION);

        let req = p.seen.lock().unwrap().last().unwrap().clone();
        assert_eq!(req.max_tokens, 2000);
        assert_eq!(req.messages[0].content, "тест промпт");
    }

    #[tokio::test]
    async fn provider_failure_surfaces_as_enhancement_failed() {
        let d = dispatcher(ScriptedProvider::failing());
        let err = d
            .enhance("text", EnhancementKind::Grammar, None)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::EnhancementFailed(_)));
        assert_eq!(EnhancerError::from(err).code(), "COLLABORATOR_FAILURE");
    }

    #[test]
    fn resolve_maps_kinds() {
        assert_eq!(
            Enhancement::resolve(EnhancementKind::Grammar, None).unwrap(),
            Enhancement::Grammar
        );
        let custom = Enhancement::resolve(EnhancementKind::Custom, Some("Be formal")).unwrap();
        assert_eq!(custom.instruction(), "Be formal");
        assert_eq!(custom.kind(), EnhancementKind::Custom);
    }
}
