//! Unified error handling for Pyhex Core.
//!
//! This module provides a unified error type that wraps domain and application
//! errors, with rich context and user-actionable suggestions.

use thiserror::Error;

use crate::application::ApplicationError;
use crate::domain::DomainError;

/// Root error type for Pyhex Core operations.
#[derive(Debug, Error, Clone)]
pub enum PyhexError {
    /// Config rule violations.
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// Errors from the application layer (orchestration failures).
    #[error("Application error: {0}")]
    Application(#[from] ApplicationError),

    /// Configuration or setup errors.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Unexpected internal errors (bugs).
    #[error("Internal error: {message}. This is a bug, please report it.")]
    Internal { message: String },
}

impl PyhexError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Domain(e) => e.suggestions(),
            Self::Application(e) => e.suggestions(),
            Self::Configuration { message } => vec![
                format!("Configuration issue: {}", message),
                "Check your setup and try again".into(),
            ],
            Self::Internal { .. } => vec!["This appears to be a bug in Pyhex".into()],
        }
    }

    /// Get error category for display/styling purposes.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Domain(e) => match e.category() {
                crate::domain::ErrorCategory::Validation => ErrorCategory::Validation,
                crate::domain::ErrorCategory::NotFound => ErrorCategory::NotFound,
                crate::domain::ErrorCategory::Template => ErrorCategory::Template,
            },
            Self::Application(e) => e.category(),
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }

    /// The message without the layer prefix, for one-line listings.
    pub fn detail(&self) -> String {
        match self {
            Self::Domain(e) => e.to_string(),
            Self::Application(e) => e.to_string(),
            Self::Configuration { message } | Self::Internal { message } => message.clone(),
        }
    }

    /// Check if this error is retryable.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Application(ApplicationError::RegistryLocked { .. })
        )
    }
}

/// Error categories for UI display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Template,
    Conflict,
    Configuration,
    Internal,
}

/// Convenient result type alias.
pub type PyhexResult<T> = Result<T, PyhexError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn config_processing_keeps_domain_suggestions() {
        let domain = DomainError::UndefinedMixin {
            path: "entities[0].mixins[0]".into(),
            mixin: "Audited".into(),
        };
        let err: PyhexError =
            ApplicationError::config(PathBuf::from("src/core/Order"), "loading core config", domain)
                .into();
        assert_eq!(err.category(), ErrorCategory::Configuration);
        let suggestions = err.suggestions();
        assert!(suggestions.iter().any(|s| s.contains("Audited")));
        assert!(suggestions.iter().any(|s| s.contains("src/core/Order")));
    }

    #[test]
    fn registry_lock_is_retryable() {
        let err: PyhexError = ApplicationError::RegistryLocked {
            path: PathBuf::from("src/core/.layer_config.yaml.lock"),
        }
        .into();
        assert!(err.is_retryable());
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }
}
