//! The per-layer registry document (`layer_config.yaml`).
//!
//! Pure data and in-memory mutations; reading and writing the file (and
//! locking it) belongs to the config processor.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{interface::Extra, yaml_error};
use crate::domain::{
    error::DomainError,
    value_objects::{DomainStatus, Layer},
};

/// Registry filename inside every layer root.
pub const REGISTRY_FILE: &str = "layer_config.yaml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerInfo {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

/// One domain as recorded in a layer registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainInfo {
    pub name: String,
    #[serde(default)]
    pub status: DomainStatus,
    #[serde(default)]
    pub config_files: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl DomainInfo {
    pub fn blank(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: DomainStatus::Blank,
            config_files: Vec::new(),
            description: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    pub layer: LayerInfo,
    #[serde(default)]
    pub domains: Vec<DomainInfo>,
    #[serde(default)]
    pub generation: Extra,
    #[serde(default)]
    pub metadata: Extra,
    #[serde(flatten)]
    pub extra: Extra,
}

impl LayerConfig {
    /// Empty registry for `layer`.
    pub fn new(layer: Layer) -> Self {
        Self {
            layer: LayerInfo {
                name: layer.as_str().to_string(),
                description: layer.description().to_string(),
            },
            domains: Vec::new(),
            generation: Extra::new(),
            metadata: Extra::new(),
            extra: BTreeMap::new(),
        }
    }

    pub fn from_yaml(text: &str) -> Result<Self, DomainError> {
        serde_yaml::from_str(text).map_err(|e| yaml_error("", &e))
    }

    pub fn to_yaml(&self) -> Result<String, DomainError> {
        serde_yaml::to_string(self).map_err(|e| yaml_error("", &e))
    }

    pub fn domain(&self, name: &str) -> Option<&DomainInfo> {
        self.domains.iter().find(|d| d.name == name)
    }

    /// Append a blank domain. Returns `false`, leaving the registry as is,
    /// when the name is already registered.
    pub fn add_blank(&mut self, name: &str) -> bool {
        if self.domain(name).is_some() {
            return false;
        }
        self.domains.push(DomainInfo::blank(name));
        true
    }

    /// Returns `false` when no domain has that name.
    pub fn set_status(&mut self, name: &str, status: DomainStatus) -> bool {
        match self.domains.iter_mut().find(|d| d.name == name) {
            Some(domain) => {
                domain.status = status;
                true
            }
            None => false,
        }
    }

    /// Replace the whole domain list. Anything not in `scanned` is dropped.
    pub fn replace_domains(&mut self, scanned: Vec<DomainInfo>) {
        self.domains = scanned;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip_preserves_domains() {
        let mut registry = LayerConfig::new(Layer::Core);
        registry.add_blank("Order");
        registry.add_blank("Customer");
        registry.set_status("Order", DomainStatus::Generated);
        registry.domains[0].config_files = vec!["domain.yaml".into(), "entities.yaml".into()];

        let back = LayerConfig::from_yaml(&registry.to_yaml().unwrap()).unwrap();
        assert_eq!(back.domains, registry.domains);
        assert_eq!(back.layer.name, "core");
    }

    #[test]
    fn add_blank_is_guarded() {
        let mut registry = LayerConfig::new(Layer::Service);
        assert!(registry.add_blank("Order"));
        assert!(!registry.add_blank("Order"));
        assert_eq!(registry.domains.len(), 1);
    }

    #[test]
    fn set_status_unknown_domain() {
        let mut registry = LayerConfig::new(Layer::Service);
        assert!(!registry.set_status("Ghost", DomainStatus::Generated));
    }

    #[test]
    fn parses_documented_shape_with_extras() {
        let yaml = r#"
layer: {name: core, description: Domain entities}
domains:
  - name: Order
    status: configured
    config_files: [domain.yaml]
    description: null
generation: {}
metadata: {owner: team-a}
schema_version: 2
"#;
        let registry = LayerConfig::from_yaml(yaml).unwrap();
        assert_eq!(registry.domains[0].status, DomainStatus::Configured);
        assert!(registry.extra.contains_key("schema_version"));
    }
}
