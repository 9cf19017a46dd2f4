// ============================================================================
// domain/error.rs - VALIDATION AND INVARIANT ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (results accumulate copies of them)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
///
/// Validation variants carry the dotted path of the offending value
/// (e.g. `entities[0].fields[2].name`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("{}{message}", at(path))]
    Validation { path: String, message: String },

    #[error("{path}: invalid identifier: {reason}")]
    InvalidIdentifier { path: String, reason: String },

    #[error("{path}: duplicate {kind} name '{name}'")]
    DuplicateName {
        path: String,
        kind: &'static str,
        name: String,
    },

    #[error("{path}: relationship references undefined entity '{target}'")]
    UndefinedEntity { path: String, target: String },

    #[error("{path}: entity references undefined mixin '{mixin}'")]
    UndefinedMixin { path: String, mixin: String },

    #[error("{path}: unknown field type '{value}'")]
    UnknownFieldType { path: String, value: String },

    #[error("{path}: unsafe default expression '{expression}'")]
    UnsafeDefault { path: String, expression: String },

    // ========================================================================
    // Preservation Marker Errors
    // ========================================================================
    #[error("line {line}: preservation region '{name}' is never closed")]
    UnclosedRegion { name: String, line: usize },

    #[error("line {line}: end marker '{name}' has no matching begin marker")]
    UnmatchedEnd { name: String, line: usize },

    #[error("line {line}: region '{inner}' opened inside region '{outer}'")]
    NestedRegion {
        outer: String,
        inner: String,
        line: usize,
    },

    #[error("line {line}: preservation region '{name}' declared twice")]
    DuplicateRegion { name: String, line: usize },

    #[error("line {line}: malformed preservation marker")]
    MalformedMarker { line: usize },

    // ========================================================================
    // Path Errors
    // ========================================================================
    #[error("template path '{path}' escapes base directory '{base}'")]
    PathEscapesBase { path: String, base: String },
}

impl DomainError {
    /// Shorthand for a plain validation failure.
    pub fn validation(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidIdentifier { path, .. } => vec![
                format!("Fix the name at '{path}'"),
                "Type names are PascalCase (Order, OrderItem)".into(),
                "Field and method names are snake_case and must not start with '_'".into(),
            ],
            Self::UndefinedEntity { target, .. } => vec![
                format!("Declare an entity named '{target}' in entities.yaml"),
                "Relationship targets must live in the same domain".into(),
            ],
            Self::UndefinedMixin { mixin, .. } => vec![
                format!("Add a mixin named '{mixin}' under 'mixins' in domain.yaml"),
            ],
            Self::UnknownFieldType { .. } => vec![
                "Supported types: string, integer, float, boolean, datetime, email, uuid, bytes"
                    .into(),
                "Wrap a type as optional[<type>] or list[<type>]".into(),
            ],
            Self::UnsafeDefault { .. } => vec![
                "Use a quoted literal ('value') or a safe expression".into(),
                "Safe expressions: None, True, False, uuid4, datetime.utcnow, list, dict".into(),
            ],
            Self::UnclosedRegion { name, .. } | Self::UnmatchedEnd { name, .. } => vec![
                format!("Pair '@pyhex:begin:{name}' with '@pyhex:end:{name}'"),
            ],
            Self::PathEscapesBase { base, .. } => vec![
                format!("Keep templates inside '{base}'"),
            ],
            _ => vec!["Check the configuration at the reported path".into()],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Validation { .. }
            | Self::InvalidIdentifier { .. }
            | Self::DuplicateName { .. }
            | Self::UnknownFieldType { .. }
            | Self::UnsafeDefault { .. } => ErrorCategory::Validation,
            Self::UndefinedEntity { .. } | Self::UndefinedMixin { .. } => ErrorCategory::NotFound,
            Self::UnclosedRegion { .. }
            | Self::UnmatchedEnd { .. }
            | Self::NestedRegion { .. }
            | Self::DuplicateRegion { .. }
            | Self::MalformedMarker { .. } => ErrorCategory::Template,
            Self::PathEscapesBase { .. } => ErrorCategory::Template,
        }
    }
}

fn at(path: &str) -> String {
    if path.is_empty() {
        String::new()
    } else {
        format!("{path}: ")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    NotFound,
    Template,
}
