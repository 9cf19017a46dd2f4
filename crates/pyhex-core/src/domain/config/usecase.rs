//! Use case layer config (strict).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{
    method::{validate_dependencies, validate_methods, DependencyConfig, MethodConfig},
    yaml_error,
};
use crate::domain::{error::DomainError, naming};

/// A named business rule attached to a use case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BusinessRule {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

/// Merged `usecase.yaml` + `business-rules.yaml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UseCaseConfig {
    pub name: String,
    #[serde(default)]
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
    #[serde(default)]
    pub business_rules: Vec<BusinessRule>,
    #[serde(default)]
    pub validation: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub constraints: BTreeMap<String, serde_yaml::Value>,
    #[serde(default)]
    pub rules: BTreeMap<String, serde_yaml::Value>,
}

impl UseCaseConfig {
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, DomainError> {
        let raw: Self = serde_yaml::from_value(value).map_err(|e| yaml_error("", &e))?;
        raw.validated()
    }

    pub fn validated(mut self) -> Result<Self, DomainError> {
        if let Some(reason) = naming::type_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: "name".into(),
                reason,
            });
        }
        validate_methods(&self.methods, "methods")?;
        validate_dependencies(&self.dependencies, "dependencies")?;
        for (i, rule) in self.business_rules.iter().enumerate() {
            if let Some(reason) = naming::identifier_violation(&rule.name) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("business_rules[{i}].name"),
                    reason,
                });
            }
        }
        if self.package_name.is_empty() {
            self.package_name = naming::to_snake_case(&self.name);
        }
        Ok(self)
    }

    pub fn has_methods(&self) -> bool {
        !self.methods.is_empty()
    }
}
