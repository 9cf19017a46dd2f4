//! Application layer for Pyhex.
//!
//! This layer contains:
//! - **Services**: config processing, layer generation, multi-layer orchestration
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! config rules itself. All validation lives in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    ConfigProcessor, DomainManager, LayerGenerator, LintFinding, LintReport, TemplateLinter,
};

// Re-export port traits (for adapter implementation)
pub use ports::{Filesystem, TemplateRenderer};

pub use error::ApplicationError;
