//! Interface and repository layer configs.
//!
//! Both are permissive: keys the generator does not model land in `extra`
//! and are handed to templates untouched, so template authors can add
//! layer-specific settings without a schema change.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    domain_config::EndpointConfig,
    method::{validate_methods, MethodConfig},
    yaml_error,
};
use crate::domain::{error::DomainError, naming};

/// Unmodelled keys of a permissive config.
pub type Extra = BTreeMap<String, serde_yaml::Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(flatten)]
    pub extra: Extra,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InterfaceConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(flatten)]
    pub extra: Extra,
}

impl InterfaceConfig {
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, DomainError> {
        let raw: Self = serde_yaml::from_value(value).map_err(|e| yaml_error("", &e))?;
        raw.validated()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        if !self.name.is_empty() {
            if let Some(reason) = naming::identifier_violation(&self.name) {
                return Err(DomainError::InvalidIdentifier {
                    path: "name".into(),
                    reason,
                });
            }
        }
        if let Some(prefix) = &self.api.prefix {
            if !prefix.starts_with('/') {
                return Err(DomainError::validation(
                    "api.prefix",
                    format!("prefix '{prefix}' must start with '/'"),
                ));
            }
        }
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            endpoint.validate(&format!("endpoints[{i}]"))?;
        }
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    /// Entities to generate repositories for; empty means all of them.
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
    #[serde(default)]
    pub storage: Extra,
    #[serde(flatten)]
    pub extra: Extra,
}

impl RepositoryConfig {
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, DomainError> {
        let raw: Self = serde_yaml::from_value(value).map_err(|e| yaml_error("", &e))?;
        raw.validated()
    }

    pub fn validated(self) -> Result<Self, DomainError> {
        for (i, entity) in self.entities.iter().enumerate() {
            if let Some(reason) = naming::type_name_violation(entity) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("entities[{i}]"),
                    reason,
                });
            }
        }
        validate_methods(&self.methods, "methods")?;
        Ok(self)
    }

    /// Whether repositories should be generated for `entity`.
    pub fn covers(&self, entity: &str) -> bool {
        self.entities.is_empty() || self.entities.iter().any(|e| e == entity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interface_keeps_unknown_keys_in_extra() {
        let cfg = InterfaceConfig::from_value(
            serde_yaml::from_str(
                "name: orders_api\napi:\n  prefix: /orders\n  tags: [orders]\n  cors: true\npagination: cursor\n",
            )
            .unwrap(),
        )
        .unwrap();
        assert_eq!(cfg.api.prefix.as_deref(), Some("/orders"));
        assert!(cfg.api.extra.contains_key("cors"));
        assert_eq!(
            cfg.extra.get("pagination").and_then(|v| v.as_str()),
            Some("cursor")
        );
    }

    #[test]
    fn interface_prefix_must_be_absolute() {
        let result = InterfaceConfig::from_value(
            serde_yaml::from_str("api:\n  prefix: orders\n").unwrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn repository_entity_filter() {
        let cfg = RepositoryConfig::from_value(
            serde_yaml::from_str("entities: [Order]\ncache: redis\n").unwrap(),
        )
        .unwrap();
        assert!(cfg.covers("Order"));
        assert!(!cfg.covers("Customer"));
        assert!(cfg.extra.contains_key("cache"));
        assert!(RepositoryConfig::default().covers("Anything"));
    }
}
