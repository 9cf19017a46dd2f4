//! Typed configuration models for every layer.
//!
//! Core and use case/service configs are strict (unknown keys fail);
//! interface, repository and registry configs are permissive and keep
//! unknown keys in an `extra` map.

pub mod comprehensive;
pub mod domain_config;
pub mod entity;
pub mod field;
pub mod interface;
pub mod merge;
pub mod method;
pub mod registry;
pub mod service;
pub mod usecase;

pub use comprehensive::{ComprehensiveConfig, LayerPayload};
pub use domain_config::{
    default_base_fields, default_crud_endpoints, DomainRelationship, EndpointConfig,
    EntityDomainConfig, MixinConfig,
};
pub use entity::{EntityConfig, RelationshipConfig};
pub use field::{DefaultValue, FieldConfig};
pub use interface::{ApiConfig, Extra, InterfaceConfig, RepositoryConfig};
pub use method::{DependencyConfig, MethodConfig, ParameterConfig};
pub use registry::{DomainInfo, LayerConfig, LayerInfo, REGISTRY_FILE};
pub use service::ServiceConfig;
pub use usecase::{BusinessRule, UseCaseConfig};

use crate::domain::error::DomainError;

/// Convert a serde_yaml failure into a validation error rooted at `path`.
///
/// serde_yaml already reports the nested location (`entities[0].fields[1]`)
/// in its message, so only the outer prefix is added here.
pub(crate) fn yaml_error(path: &str, err: &serde_yaml::Error) -> DomainError {
    DomainError::validation(path, err.to_string())
}
