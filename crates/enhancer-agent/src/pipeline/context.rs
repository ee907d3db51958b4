//! Services the router needs, reached through one trait so adapters and
//! tests can supply their own wiring.

use enhancer_core::config::LimitsConfig;
use enhancer_users::EnhancerRegistry;

use crate::dispatcher::Dispatcher;
use crate::transcribe::SpeechToText;

pub trait EnhancerContext: Send + Sync {
    fn registry(&self) -> &EnhancerRegistry;
    fn dispatcher(&self) -> &Dispatcher;
    fn transcriber(&self) -> &dyn SpeechToText;
    fn limits(&self) -> &LimitsConfig;
}
