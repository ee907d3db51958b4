pub mod dispatcher;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod provider;
pub mod transcribe;

pub use dispatcher::{DispatchError, Dispatcher, Enhancement};
pub use openai::OpenAiProvider;
pub use provider::{LlmProvider, ProviderError};
pub use transcribe::{SpeechToText, TranscriptionError, WhisperTranscriber};
