//! Entities and their relationships.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::field::FieldConfig;
use crate::domain::{
    error::DomainError,
    naming,
    value_objects::RelationshipKind,
};

/// A relationship declared on an entity.
///
/// The target must be an entity of the same domain; that check needs the
/// whole domain and therefore runs in `EntityDomainConfig`, not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelationshipConfig {
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

impl RelationshipConfig {
    pub fn new(target: impl Into<String>, kind: RelationshipKind) -> Self {
        Self {
            target: target.into(),
            kind,
            back_populates: None,
            foreign_key: None,
        }
    }

    /// Same target and same kind.
    pub fn is_equivalent(&self, other: &Self) -> bool {
        self.target == other.target && self.kind == other.kind
    }
}

/// A persisted business entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
    #[serde(default)]
    pub relationships: Vec<RelationshipConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_name: Option<String>,
    #[serde(default)]
    pub mixins: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl EntityConfig {
    pub fn new(name: impl Into<String>, fields: Vec<FieldConfig>) -> Self {
        Self {
            name: name.into(),
            fields,
            relationships: Vec::new(),
            table_name: None,
            mixins: Vec::new(),
            description: None,
        }
    }

    /// Table name, falling back to the snake_case entity name.
    pub fn table_name(&self) -> String {
        self.table_name
            .clone()
            .unwrap_or_else(|| naming::to_snake_case(&self.name))
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|f| f.name == name)
    }

    pub fn field(&self, name: &str) -> Option<&FieldConfig> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field-phase validation: names, non-empty field list, field rules.
    ///
    /// Also fills in the derived table name so it is fixed from here on.
    pub fn validate(&mut self, path: &str) -> Result<(), DomainError> {
        if let Some(reason) = naming::type_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}.name"),
                reason,
            });
        }
        if self.fields.is_empty() {
            return Err(DomainError::validation(
                format!("{path}.fields"),
                format!("entity '{}' must declare at least one field", self.name),
            ));
        }
        for (i, field) in self.fields.iter().enumerate() {
            field.validate(&format!("{path}.fields[{i}]"))?;
        }
        self.ensure_unique_fields(path)?;
        for (i, rel) in self.relationships.iter().enumerate() {
            if let Some(reason) = naming::type_name_violation(&rel.target) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("{path}.relationships[{i}].target"),
                    reason,
                });
            }
        }
        if self.table_name.is_none() {
            self.table_name = Some(naming::to_snake_case(&self.name));
        }
        Ok(())
    }

    /// Field names must be unique within the entity.
    pub fn ensure_unique_fields(&self, path: &str) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(DomainError::DuplicateName {
                    path: format!("{path}.fields"),
                    kind: "field",
                    name: field.name.clone(),
                });
            }
        }
        Ok(())
    }
}
