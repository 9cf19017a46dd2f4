//! Application layer errors.
//!
//! These errors represent failures in orchestration (I/O, rendering,
//! registry access), not config rules. Config rule violations are
//! `DomainError` from `crate::domain`, carried here as the source of a
//! config processing failure.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::{DomainError, Layer};
use crate::error::ErrorCategory;

/// Errors that occur during application orchestration.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// A config file could not be read, parsed, merged or validated.
    #[error("Config processing failed while {operation} {}: {reason}", path.display())]
    ConfigProcessing {
        path: PathBuf,
        operation: &'static str,
        reason: String,
        #[source]
        source: Option<DomainError>,
    },

    /// Template file missing, or outside the template base directory.
    #[error("Template resolution failed for {}: {reason}", path.display())]
    TemplateResolution { path: PathBuf, reason: String },

    /// Template syntax or runtime error.
    #[error("Template rendering failed for {template}: {reason}")]
    RenderingFailed { template: String, reason: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {}: {reason}", path.display())]
    FilesystemError { path: PathBuf, reason: String },

    /// The domain directory does not exist in that layer.
    #[error("Domain '{name}' not found in layer {layer} (expected {})", path.display())]
    DomainNotFound {
        layer: Layer,
        name: String,
        path: PathBuf,
    },

    /// Another invocation holds the registry lock.
    #[error("Layer registry is locked by another invocation: {}", path.display())]
    RegistryLocked { path: PathBuf },
}

impl ApplicationError {
    pub fn config(
        path: impl Into<PathBuf>,
        operation: &'static str,
        source: DomainError,
    ) -> Self {
        Self::ConfigProcessing {
            path: path.into(),
            operation,
            reason: source.to_string(),
            source: Some(source),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ConfigProcessing { path, source, .. } => {
                let mut out = source.as_ref().map(DomainError::suggestions).unwrap_or_default();
                out.push(format!("Check the YAML in {}", path.display()));
                out
            }
            Self::TemplateResolution { path, .. } => vec![
                format!("Template: {}", path.display()),
                "Check the templates.root setting: pyhex config get templates.root".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::DomainNotFound { name, layer, .. } => vec![
                format!("Create it first: pyhex domain add {name} --layer {layer}"),
                format!("Or generate from a config file: pyhex generate {layer} {name} --from-config <FILE>"),
            ],
            Self::RegistryLocked { path } => vec![
                "Wait for the other pyhex invocation to finish".into(),
                format!(
                    "If no other invocation is running, remove the stale lock: {}",
                    path.display()
                ),
            ],
            Self::RenderingFailed { .. } => vec!["Check the template syntax".into()],
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ConfigProcessing { .. } => ErrorCategory::Configuration,
            Self::TemplateResolution { .. } | Self::RenderingFailed { .. } => {
                ErrorCategory::Template
            }
            Self::DomainNotFound { .. } => ErrorCategory::NotFound,
            Self::RegistryLocked { .. } => ErrorCategory::Conflict,
            Self::FilesystemError { .. } => ErrorCategory::Internal,
        }
    }
}
