//! Service layer config (strict).

use serde::{Deserialize, Serialize};

use super::{
    method::{validate_dependencies, validate_methods, DependencyConfig, MethodConfig},
    yaml_error,
};
use crate::domain::{error::DomainError, naming};

const SERVICE_SUFFIX: &str = "Service";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServiceConfig {
    /// Must end with `Service`.
    pub name: String,
    /// Snake_case name with the `Service` suffix stripped.
    #[serde(default)]
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default)]
    pub usecases: Vec<String>,
    #[serde(default)]
    pub methods: Vec<MethodConfig>,
    #[serde(default)]
    pub dependencies: Vec<DependencyConfig>,
}

impl ServiceConfig {
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
        let Some(stem) = self.name.strip_suffix(SERVICE_SUFFIX).filter(|s| !s.is_empty()) else {
            return Err(DomainError::validation(
                "name",
                format!("service name '{}' must end with '{SERVICE_SUFFIX}'", self.name),
            ));
        };
        let stem = stem.to_string();
        for (i, usecase) in self.usecases.iter().enumerate() {
            if let Some(reason) = naming::type_name_violation(usecase) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("usecases[{i}]"),
                    reason,
                });
            }
        }
        validate_methods(&self.methods, "methods")?;
        validate_dependencies(&self.dependencies, "dependencies")?;
        if self.package_name.is_empty() {
            self.package_name = naming::to_snake_case(&stem);
        }
        Ok(self)
    }
}
