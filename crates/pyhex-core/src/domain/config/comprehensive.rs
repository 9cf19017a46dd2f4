//! Whole-domain ("gen-all") configs and per-layer payloads.

use serde_yaml::Value;

use super::{
    domain_config::EntityDomainConfig,
    interface::{InterfaceConfig, RepositoryConfig},
    merge::merge_core_documents,
    service::ServiceConfig,
    usecase::UseCaseConfig,
};
use crate::domain::{error::DomainError, value_objects::Layer};

/// The validated config of one layer for one domain.
#[derive(Debug, Clone, PartialEq)]
pub enum LayerPayload {
    Core(EntityDomainConfig),
    Repository(RepositoryConfig),
    UseCase(UseCaseConfig),
    Service(ServiceConfig),
    Interface(InterfaceConfig),
}

impl LayerPayload {
    pub const fn layer(&self) -> Layer {
        match self {
            Self::Core(_) => Layer::Core,
            Self::Repository(_) => Layer::Repository,
            Self::UseCase(_) => Layer::UseCase,
            Self::Service(_) => Layer::Service,
            Self::Interface(_) => Layer::Interface,
        }
    }

    /// Validate a raw (already merged) document for `layer`.
    pub fn from_value(layer: Layer, value: Value) -> Result<Self, DomainError> {
        Ok(match layer {
            Layer::Core => Self::Core(EntityDomainConfig::from_value(value)?),
            Layer::Repository => Self::Repository(RepositoryConfig::from_value(value)?),
            Layer::UseCase => Self::UseCase(UseCaseConfig::from_value(value)?),
            Layer::Service => Self::Service(ServiceConfig::from_value(value)?),
            Layer::Interface => Self::Interface(InterfaceConfig::from_value(value)?),
        })
    }
}

/// A domain config carrying every layer in one document.
///
/// Core keys (`domain`, `entities`, `base_fields`, `mixins`,
/// `relationships`, `sqlmodel_config`) sit at top level; the other layers
/// are optional sections named after the layer.
#[derive(Debug, Clone, PartialEq)]
pub struct ComprehensiveConfig {
    pub domain: EntityDomainConfig,
    pub repository: Option<RepositoryConfig>,
    pub usecase: Option<UseCaseConfig>,
    pub service: Option<ServiceConfig>,
    pub interface: Option<InterfaceConfig>,
}

const SECTION_KEYS: [&str; 4] = ["repository", "usecase", "service", "interface"];

fn prefixed(section: &str, err: DomainError) -> DomainError {
    match err {
        DomainError::Validation { path, message } => DomainError::Validation {
            path: join(section, &path),
            message,
        },
        DomainError::InvalidIdentifier { path, reason } => DomainError::InvalidIdentifier {
            path: join(section, &path),
            reason,
        },
        DomainError::DuplicateName { path, kind, name } => DomainError::DuplicateName {
            path: join(section, &path),
            kind,
            name,
        },
        other => other,
    }
}

fn join(section: &str, path: &str) -> String {
    if path.is_empty() {
        section.to_string()
    } else {
        format!("{section}.{path}")
    }
}

impl ComprehensiveConfig {
    pub fn from_value(value: Value) -> Result<Self, DomainError> {
        let Value::Mapping(mut top) = value else {
            return Err(DomainError::validation("", "expected a mapping at the top level"));
        };

        let mut sections: [Option<Value>; 4] = Default::default();
        for (slot, name) in sections.iter_mut().zip(SECTION_KEYS) {
            *slot = top.remove(name).filter(|v| !v.is_null());
        }
        let [repository, usecase, service, interface] = sections;

        let core = Value::Mapping(top);
        let merged = merge_core_documents(Some(&core), core.get("entities"))?;
        let domain = EntityDomainConfig::from_value(merged)?;

        Ok(Self {
            domain,
            repository: repository
                .map(RepositoryConfig::from_value)
                .transpose()
                .map_err(|e| prefixed("repository", e))?,
            usecase: usecase
                .map(UseCaseConfig::from_value)
                .transpose()
                .map_err(|e| prefixed("usecase", e))?,
            service: service
                .map(ServiceConfig::from_value)
                .transpose()
                .map_err(|e| prefixed("service", e))?,
            interface: interface
                .map(InterfaceConfig::from_value)
                .transpose()
                .map_err(|e| prefixed("interface", e))?,
        })
    }

    /// Whether the config has content for `layer`.
    ///
    /// - core and repository need at least one entity
    /// - use case needs at least one method
    /// - service needs its section
    /// - interface needs its section or any endpoint
    pub fn applies_to(&self, layer: Layer) -> bool {
        match layer {
            Layer::Core | Layer::Repository => !self.domain.entities.is_empty(),
            Layer::UseCase => self.usecase.as_ref().is_some_and(UseCaseConfig::has_methods),
            Layer::Service => self.service.is_some(),
            Layer::Interface => self.interface.is_some() || !self.domain.endpoints.is_empty(),
        }
    }

    /// The payload for `layer`, or `None` when the layer does not apply.
    pub fn payload(&self, layer: Layer) -> Option<LayerPayload> {
        if !self.applies_to(layer) {
            return None;
        }
        Some(match layer {
            Layer::Core => LayerPayload::Core(self.domain.clone()),
            Layer::Repository => {
                LayerPayload::Repository(self.repository.clone().unwrap_or_default())
            }
            Layer::UseCase => LayerPayload::UseCase(self.usecase.clone()?),
            Layer::Service => LayerPayload::Service(self.service.clone()?),
            Layer::Interface => {
                LayerPayload::Interface(self.interface.clone().unwrap_or_default())
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::config::field::DefaultValue;

    fn parse(text: &str) -> Result<ComprehensiveConfig, DomainError> {
        ComprehensiveConfig::from_value(serde_yaml::from_str(text).unwrap())
    }

    #[test]
    fn order_scenario() {
        let cfg = parse(
            "domain: {name: Order}\nentities:\n  - name: Order\n    fields: [{name: total, type: float}]\n",
        )
        .unwrap();
        let domain = &cfg.domain;
        assert_eq!(domain.plural_name, "Orders");
        assert_eq!(domain.package_name, "order");
        let names: Vec<&str> = domain.entities[0]
            .fields
            .iter()
            .map(|f| f.name.as_str())
            .collect();
        assert_eq!(names, ["id", "created_at", "updated_at", "total"]);
        assert_eq!(
            domain.entities[0].fields[0].default,
            Some(DefaultValue::expression("uuid4"))
        );
        assert_eq!(domain.endpoints.len(), 5);
    }

    #[test]
    fn layer_applicability() {
        let cfg = parse(
            r#"
domain: {name: Order}
entities:
  - name: Order
    fields: [{name: total, type: float}]
usecase:
  name: PlaceOrder
service:
  name: OrderService
"#,
        )
        .unwrap();
        assert!(cfg.applies_to(Layer::Core));
        assert!(cfg.applies_to(Layer::Repository));
        assert!(!cfg.applies_to(Layer::UseCase), "use case without methods");
        assert!(cfg.applies_to(Layer::Service));
        assert!(cfg.applies_to(Layer::Interface), "default endpoints");
        assert!(cfg.payload(Layer::UseCase).is_none());
    }

    #[test]
    fn empty_domain_applies_nowhere() {
        let cfg = parse("domain: {name: Order}\n").unwrap();
        for layer in Layer::ALL {
            assert!(!cfg.applies_to(layer), "{layer}");
        }
    }

    #[test]
    fn section_errors_carry_section_path() {
        let err = parse("domain: {name: Order}\nservice:\n  name: OrderManager\n").unwrap_err();
        assert!(matches!(err, DomainError::Validation { ref path, .. } if path == "service.name"));
    }
}
