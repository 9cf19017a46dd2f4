//! Pyhex Core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the Pyhex
//! application generator, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            pyhex-cli (CLI)              │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (ConfigProcessor, LayerGenerator,      │
//! │   DomainManager, TemplateLinter)        │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      Application Ports (Traits)         │
//! │     (Filesystem, TemplateRenderer)      │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     pyhex-adapters (Infrastructure)     │
//! │ (LocalFilesystem, MiniJinjaRenderer...) │
//! └─────────────────────────────────────────┘
//!                    │
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Domain Layer (Pure Logic)       │
//! │  (config models, markers, contexts)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pyhex_core::prelude::*;
//!
//! let processor = ConfigProcessor::new(Box::new(filesystem));
//! let layout = ProjectLayout::new(".", "src", "templates");
//! let generator = LayerGenerator::new(processor, Box::new(renderer), layout);
//!
//! let result = generator.generate(Layer::Core, "Order")?;
//! assert!(result.success);
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ConfigProcessor, DomainManager, LayerGenerator, TemplateLinter,
        ports::{Filesystem, TemplateRenderer},
    };
    pub use crate::domain::{
        ComprehensiveConfig, DomainStatus, EntityDomainConfig, GenerationResult, Layer,
        LayerPayload, ProjectLayout, TemplateContext,
    };
    pub use crate::error::{PyhexError, PyhexResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
