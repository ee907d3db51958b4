use thiserror::Error;

use enhancer_core::EnhancerError;

/// Registry errors. Kept separate from EnhancerError so callers can match on
/// the cap without string inspection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Custom enhancer limit reached ({limit})")]
    LimitExceeded { limit: usize },
}

impl From<RegistryError> for EnhancerError {
    fn from(e: RegistryError) -> Self {
        match e {
            RegistryError::LimitExceeded { limit } => EnhancerError::LimitExceeded { limit },
        }
    }
}

pub type Result<T> = std::result::Result<T, RegistryError>;
