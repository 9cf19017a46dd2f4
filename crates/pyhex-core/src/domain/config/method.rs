//! Methods and dependencies shared by the use case, service and repository configs.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::domain::{error::DomainError, naming};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ParameterConfig {
    pub name: String,
    /// Python annotation, emitted verbatim.
    #[serde(rename = "type")]
    pub type_hint: String,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn default_true() -> bool {
    true
}

/// A method exposed by a generated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MethodConfig {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub parameters: Vec<ParameterConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub returns: Option<String>,
    #[serde(default)]
    pub is_async: bool,
}

impl MethodConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: Vec::new(),
            returns: None,
            is_async: false,
        }
    }

    fn validate(&self, path: &str) -> Result<(), DomainError> {
        if let Some(reason) = naming::member_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}.name"),
                reason,
            });
        }
        let mut seen = HashSet::new();
        for (i, param) in self.parameters.iter().enumerate() {
            if let Some(reason) = naming::member_name_violation(&param.name) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("{path}.parameters[{i}].name"),
                    reason,
                });
            }
            if !seen.insert(param.name.as_str()) {
                return Err(DomainError::DuplicateName {
                    path: format!("{path}.parameters"),
                    kind: "parameter",
                    name: param.name.clone(),
                });
            }
        }
        Ok(())
    }
}

/// Validate every method and reject duplicate method names.
pub(crate) fn validate_methods(methods: &[MethodConfig], path: &str) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for (i, method) in methods.iter().enumerate() {
        method.validate(&format!("{path}[{i}]"))?;
        if !seen.insert(method.name.as_str()) {
            return Err(DomainError::DuplicateName {
                path: path.to_string(),
                kind: "method",
                name: method.name.clone(),
            });
        }
    }
    Ok(())
}

/// A collaborator injected into a generated class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DependencyConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

pub(crate) fn validate_dependencies(
    deps: &[DependencyConfig],
    path: &str,
) -> Result<(), DomainError> {
    let mut seen = HashSet::new();
    for (i, dep) in deps.iter().enumerate() {
        if let Some(reason) = naming::member_name_violation(&dep.name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}[{i}].name"),
                reason,
            });
        }
        if let Some(reason) = naming::type_name_violation(&dep.type_name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}[{i}].type"),
                reason,
            });
        }
        if !seen.insert(dep.name.as_str()) {
            return Err(DomainError::DuplicateName {
                path: path.to_string(),
                kind: "dependency",
                name: dep.name.clone(),
            });
        }
    }
    Ok(())
}
