use thiserror::Error;

/// Top-level error taxonomy. Crate-local errors map into one of these kinds
/// so handlers can report a stable code alongside the user-facing message.
#[derive(Debug, Error)]
pub enum EnhancerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Custom enhancer limit reached ({limit})")]
    LimitExceeded { limit: usize },

    #[error("Invalid enhancement: {0}")]
    InvalidEnhancement(String),

    #[error("{service} failed: {reason}")]
    CollaboratorFailure { service: String, reason: String },

    #[error("Pending text not found: {0}")]
    ExtractionFailure(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl EnhancerError {
    /// Short error code string used in log fields.
    pub fn code(&self) -> &'static str {
        match self {
            EnhancerError::Config(_) => "CONFIG_ERROR",
            EnhancerError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            EnhancerError::InvalidEnhancement(_) => "INVALID_ENHANCEMENT",
            EnhancerError::CollaboratorFailure { .. } => "COLLABORATOR_FAILURE",
            EnhancerError::ExtractionFailure(_) => "EXTRACTION_FAILURE",
            EnhancerError::Serialization(_) => "SERIALIZATION_ERROR",
            EnhancerError::Io(_) => "IO_ERROR",
        }
    }

    /// Whether the user can fix the problem themselves (bad input, full list).
    pub fn is_user_recoverable(&self) -> bool {
        matches!(
            self,
            EnhancerError::LimitExceeded { .. } | EnhancerError::InvalidEnhancement(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, EnhancerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            EnhancerError::LimitExceeded { limit: 3 }.code(),
            "LIMIT_EXCEEDED"
        );
        assert_eq!(
            EnhancerError::ExtractionFailure("x".into()).code(),
            "EXTRACTION_FAILURE"
        );
    }

    #[test]
    fn only_input_errors_are_user_recoverable() {
        assert!(EnhancerError::LimitExceeded { limit: 3 }.is_user_recoverable());
        assert!(EnhancerError::InvalidEnhancement("x".into()).is_user_recoverable());
        assert!(!EnhancerError::CollaboratorFailure {
            service: "openai".into(),
            reason: "timeout".into()
        }
        .is_user_recoverable());
    }
}
