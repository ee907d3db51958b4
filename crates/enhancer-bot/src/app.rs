use enhancer_agent::pipeline::EnhancerContext;
use enhancer_agent::transcribe::SpeechToText;
use enhancer_agent::{Dispatcher, WhisperTranscriber};
use enhancer_core::config::{EnhancerConfig, LimitsConfig};
use enhancer_users::EnhancerRegistry;

/// Central shared state, passed as `Arc<AppState>` to every Telegram handler.
pub struct AppState {
    pub config: EnhancerConfig,
    pub registry: EnhancerRegistry,
    pub dispatcher: Dispatcher,
    pub transcriber: WhisperTranscriber,
}

impl AppState {
    pub fn new(
        config: EnhancerConfig,
        registry: EnhancerRegistry,
        dispatcher: Dispatcher,
        transcriber: WhisperTranscriber,
    ) -> Self {
        Self {
            config,
            registry,
            dispatcher,
            transcriber,
        }
    }
}

impl EnhancerContext for AppState {
    fn registry(&self) -> &EnhancerRegistry {
        &self.registry
    }

    fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    fn transcriber(&self) -> &dyn SpeechToText {
        &self.transcriber
    }

    fn limits(&self) -> &LimitsConfig {
        &self.config.limits
    }
}
