//! Core domain layer for Pyhex.
//!
//! This module contains pure business logic: config models and their
//! validation, naming rules, preservation markers, template contexts and
//! generation results. All I/O and rendering concerns are handled via ports
//! (traits) defined in the application layer.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: No filesystem, network, or external calls
//! - **Serde only for shape**: YAML values are parsed by the caller and
//!   validated here
//! - **Values, not identities**: All domain objects are Clone + PartialEq

pub mod config;
pub mod context;
pub mod error;
pub mod layout;
pub mod markers;
pub mod naming;
pub mod paths;
pub mod result;
pub mod value_objects;

pub use config::{
    ComprehensiveConfig, DomainInfo, EndpointConfig, EntityConfig, EntityDomainConfig,
    FieldConfig, InterfaceConfig, LayerConfig, LayerPayload, RepositoryConfig, ServiceConfig,
    UseCaseConfig,
};
pub use context::TemplateContext;
pub use error::{DomainError, ErrorCategory};
pub use layout::ProjectLayout;
pub use result::{GenerationResult, WriteOutcome};
pub use value_objects::{DomainStatus, FieldType, HttpMethod, Layer, RelationshipKind};
