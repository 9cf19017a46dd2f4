//! The core-layer domain config: entities plus domain-wide field rules.
//!
//! Construction runs in two phases, mirroring field validators followed by
//! model validators:
//!
//! 1. **Field phase**: every name, type and default is checked in isolation.
//! 2. **After phase**: duplicate names are rejected, then the config is
//!    completed in a fixed order: derive plural/package names, prepend base
//!    fields, append mixin fields, materialize domain-level relationships,
//!    check relationship targets, synthesize default CRUD endpoints.
//!
//! Base fields are prepended while mixin fields are appended. The two orders
//! differ on purpose and generated models depend on the resulting column
//! order, so do not unify them.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use super::{
    entity::{EntityConfig, RelationshipConfig},
    field::{DefaultValue, FieldConfig},
    yaml_error,
};
use crate::domain::{
    error::DomainError,
    naming,
    value_objects::{FieldType, HttpMethod, RelationshipKind},
};

/// A named, reusable bundle of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MixinConfig {
    pub name: String,
    pub fields: Vec<FieldConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// A relationship declared at domain level and spliced onto `source`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DomainRelationship {
    pub source: String,
    pub target: String,
    #[serde(rename = "type")]
    pub kind: RelationshipKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_populates: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub foreign_key: Option<String>,
}

impl DomainRelationship {
    fn to_entity_relationship(&self) -> RelationshipConfig {
        RelationshipConfig {
            target: self.target.clone(),
            kind: self.kind,
            back_populates: self.back_populates.clone(),
            foreign_key: self.foreign_key.clone(),
        }
    }
}

/// One HTTP endpoint exposed for the domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointConfig {
    pub name: String,
    pub method: HttpMethod,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity: Option<String>,
}

impl EndpointConfig {
    pub fn new(name: impl Into<String>, method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            method,
            path: path.into(),
            description: None,
            entity: None,
        }
    }

    pub(crate) fn validate(&self, path: &str) -> Result<(), DomainError> {
        if let Some(reason) = naming::member_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}.name"),
                reason,
            });
        }
        if !self.path.starts_with('/') {
            return Err(DomainError::validation(
                format!("{path}.path"),
                format!("endpoint path '{}' must start with '/'", self.path),
            ));
        }
        Ok(())
    }
}

/// The default CRUD endpoint set, in canonical order.
pub fn default_crud_endpoints(domain: &str) -> Vec<EndpointConfig> {
    [
        ("create", HttpMethod::Post, "/", format!("Create a new {domain}")),
        ("get_by_id", HttpMethod::Get, "/{id}", format!("Get a {domain} by id")),
        ("list", HttpMethod::Get, "/", format!("List {domain} records")),
        ("update", HttpMethod::Put, "/{id}", format!("Update a {domain}")),
        ("delete", HttpMethod::Delete, "/{id}", format!("Delete a {domain}")),
    ]
    .into_iter()
    .map(|(name, method, path, description)| EndpointConfig {
        description: Some(description),
        ..EndpointConfig::new(name, method, path)
    })
    .collect()
}

/// Base fields applied when a domain config does not declare `base_fields`.
pub fn default_base_fields() -> Vec<FieldConfig> {
    vec![
        FieldConfig::new("id", FieldType::Uuid)
            .indexed()
            .unique()
            .with_default(DefaultValue::expression("uuid4")),
        FieldConfig::new("created_at", FieldType::Datetime)
            .with_default(DefaultValue::expression("datetime.utcnow")),
        FieldConfig::new("updated_at", FieldType::Datetime)
            .with_default(DefaultValue::expression("datetime.utcnow")),
    ]
}

/// Validated configuration of one domain in the core layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntityDomainConfig {
    pub name: String,
    /// Derived via [`naming::pluralize`] when empty.
    #[serde(default)]
    pub plural_name: String,
    /// Derived via [`naming::to_snake_case`] when empty.
    #[serde(default)]
    pub package_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// `None` means the conventional base set; `Some(vec![])` disables it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_fields: Option<Vec<FieldConfig>>,
    #[serde(default)]
    pub mixins: Vec<MixinConfig>,
    #[serde(default)]
    pub relationships: Vec<DomainRelationship>,
    #[serde(default)]
    pub entities: Vec<EntityConfig>,
    #[serde(default)]
    pub endpoints: Vec<EndpointConfig>,
    #[serde(default)]
    pub sqlmodel_config: BTreeMap<String, serde_yaml::Value>,
}

impl EntityDomainConfig {
    /// Minimal config with only a name; call [`Self::validated`] before use.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plural_name: String::new(),
            package_name: String::new(),
            description: None,
            base_fields: None,
            mixins: Vec::new(),
            relationships: Vec::new(),
            entities: Vec::new(),
            endpoints: Vec::new(),
            sqlmodel_config: BTreeMap::new(),
        }
    }

    /// Deserialize a merged YAML document and run both validation phases.
    pub fn from_value(value: serde_yaml::Value) -> Result<Self, DomainError> {
        let raw: Self = serde_yaml::from_value(value).map_err(|e| yaml_error("", &e))?;
        raw.validated()
    }

    /// Run both validation phases, returning the completed config.
    ///
    /// Idempotent: validating an already validated config yields an equal one.
    pub fn validated(mut self) -> Result<Self, DomainError> {
        self.validate_fields()?;
        self.ensure_unique_names()?;
        self.derive_names();
        self.apply_base_fields();
        self.apply_mixins()?;
        self.apply_domain_relationships()?;
        self.check_relationship_targets()?;
        for (i, entity) in self.entities.iter().enumerate() {
            entity.ensure_unique_fields(&format!("entities[{i}]"))?;
        }
        self.synthesize_default_endpoints();
        Ok(self)
    }

    /// Non-fatal findings worth logging.
    pub fn warnings(&self) -> Vec<String> {
        let mut warnings = Vec::new();
        if self.entity(&self.name).is_some() {
            warnings.push(format!(
                "domain name '{}' is also used as an entity name",
                self.name
            ));
        }
        warnings
    }

    pub fn entity(&self, name: &str) -> Option<&EntityConfig> {
        self.entities.iter().find(|e| e.name == name)
    }

    pub fn mixin(&self, name: &str) -> Option<&MixinConfig> {
        self.mixins.iter().find(|m| m.name == name)
    }

    pub fn entity_names(&self) -> Vec<&str> {
        self.entities.iter().map(|e| e.name.as_str()).collect()
    }

    // ── Field phase ──────────────────────────────────────────────────────────

    fn validate_fields(&mut self) -> Result<(), DomainError> {
        if let Some(reason) = naming::type_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: "name".into(),
                reason,
            });
        }
        if !self.package_name.is_empty() {
            if let Some(reason) = naming::member_name_violation(&self.package_name) {
                return Err(DomainError::InvalidIdentifier {
                    path: "package_name".into(),
                    reason,
                });
            }
        }
        if let Some(base) = &self.base_fields {
            for (i, field) in base.iter().enumerate() {
                field.validate(&format!("base_fields[{i}]"))?;
            }
        }
        for (i, mixin) in self.mixins.iter().enumerate() {
            if let Some(reason) = naming::identifier_violation(&mixin.name) {
                return Err(DomainError::InvalidIdentifier {
                    path: format!("mixins[{i}].name"),
                    reason,
                });
            }
            for (j, field) in mixin.fields.iter().enumerate() {
                field.validate(&format!("mixins[{i}].fields[{j}]"))?;
            }
        }
        for (i, entity) in self.entities.iter_mut().enumerate() {
            entity.validate(&format!("entities[{i}]"))?;
        }
        for (i, endpoint) in self.endpoints.iter().enumerate() {
            endpoint.validate(&format!("endpoints[{i}]"))?;
        }
        Ok(())
    }

    // ── After phase ──────────────────────────────────────────────────────────

    fn ensure_unique_names(&self) -> Result<(), DomainError> {
        let mut seen = HashSet::new();
        for entity in &self.entities {
            if !seen.insert(entity.name.as_str()) {
                return Err(DomainError::DuplicateName {
                    path: "entities".into(),
                    kind: "entity",
                    name: entity.name.clone(),
                });
            }
        }
        let mut seen = HashSet::new();
        for mixin in &self.mixins {
            if !seen.insert(mixin.name.as_str()) {
                return Err(DomainError::DuplicateName {
                    path: "mixins".into(),
                    kind: "mixin",
                    name: mixin.name.clone(),
                });
            }
        }
        if let Some(base) = &self.base_fields {
            let mut seen = HashSet::new();
            for field in base {
                if !seen.insert(field.name.as_str()) {
                    return Err(DomainError::DuplicateName {
                        path: "base_fields".into(),
                        kind: "field",
                        name: field.name.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn derive_names(&mut self) {
        if self.plural_name.is_empty() {
            self.plural_name = naming::pluralize(&self.name);
        }
        if self.package_name.is_empty() {
            self.package_name = naming::to_snake_case(&self.name);
        }
    }

    /// Prepend base fields an entity does not already define.
    ///
    /// Base fields keep their declared order and sit in front of the
    /// entity's own fields; an entity's own definition always wins.
    fn apply_base_fields(&mut self) {
        let base = self.base_fields.get_or_insert_with(default_base_fields).clone();
        for entity in &mut self.entities {
            let missing: Vec<FieldConfig> = base
                .iter()
                .filter(|f| !entity.has_field(&f.name))
                .cloned()
                .collect();
            if missing.is_empty() {
                continue;
            }
            entity.fields.splice(0..0, missing);
        }
    }

    /// Append mixin fields an entity does not already define.
    fn apply_mixins(&mut self) -> Result<(), DomainError> {
        let mixins: HashMap<&str, &MixinConfig> =
            self.mixins.iter().map(|m| (m.name.as_str(), m)).collect();

        for (i, entity) in self.entities.iter_mut().enumerate() {
            for (j, mixin_name) in entity.mixins.clone().iter().enumerate() {
                let mixin = mixins.get(mixin_name.as_str()).ok_or_else(|| {
                    DomainError::UndefinedMixin {
                        path: format!("entities[{i}].mixins[{j}]"),
                        mixin: mixin_name.clone(),
                    }
                })?;
                for field in &mixin.fields {
                    if !entity.has_field(&field.name) {
                        entity.fields.push(field.clone());
                    }
                }
            }
        }
        Ok(())
    }

    /// Splice domain-level relationships onto their source entities.
    fn apply_domain_relationships(&mut self) -> Result<(), DomainError> {
        for (i, rel) in self.relationships.iter().enumerate() {
            let entity = self
                .entities
                .iter_mut()
                .find(|e| e.name == rel.source)
                .ok_or_else(|| DomainError::UndefinedEntity {
                    path: format!("relationships[{i}].source"),
                    target: rel.source.clone(),
                })?;
            let candidate = rel.to_entity_relationship();
            if !entity
                .relationships
                .iter()
                .any(|existing| existing.is_equivalent(&candidate))
            {
                entity.relationships.push(candidate);
            }
        }
        Ok(())
    }

    fn check_relationship_targets(&self) -> Result<(), DomainError> {
        let names: HashSet<&str> = self.entities.iter().map(|e| e.name.as_str()).collect();
        for (i, entity) in self.entities.iter().enumerate() {
            for (j, rel) in entity.relationships.iter().enumerate() {
                if !names.contains(rel.target.as_str()) {
                    return Err(DomainError::UndefinedEntity {
                        path: format!("entities[{i}].relationships[{j}].target"),
                        target: rel.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    fn synthesize_default_endpoints(&mut self) {
        if self.endpoints.is_empty() && !self.entities.is_empty() {
            self.endpoints = default_crud_endpoints(&self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> Result<EntityDomainConfig, DomainError> {
        EntityDomainConfig::from_value(serde_yaml::from_str(yaml).unwrap())
    }

    fn field_names(entity: &EntityConfig) -> Vec<&str> {
        entity.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn derives_plural_and_package() {
        let cfg = parse("name: OrderItem\n").unwrap();
        assert_eq!(cfg.plural_name, "OrderItems");
        assert_eq!(cfg.package_name, "order_item");
    }

    #[test]
    fn explicit_plural_is_kept() {
        let cfg = parse("name: Person\nplural_name: People\n").unwrap();
        assert_eq!(cfg.plural_name, "People");
    }

    #[test]
    fn validation_is_idempotent() {
        let cfg = parse(
            "name: Order\nentities:\n  - name: Order\n    fields:\n      - {name: total, type: float}\n",
        )
        .unwrap();
        let again = cfg.clone().validated().unwrap();
        assert_eq!(cfg, again);
    }

    #[test]
    fn base_fields_prepend_and_never_override() {
        let cfg = parse(
            r#"
name: Shop
base_fields:
  - {name: id, type: integer}
  - {name: tenant, type: string}
entities:
  - name: Product
    fields:
      - {name: title, type: string}
      - {name: id, type: uuid}
"#,
        )
        .unwrap();
        let product = cfg.entity("Product").unwrap();
        assert_eq!(field_names(product), ["tenant", "title", "id"]);
        assert_eq!(product.field("id").unwrap().field_type, FieldType::Uuid);
    }

    #[test]
    fn mixin_fields_append_in_declaration_order() {
        let cfg = parse(
            r#"
name: Shop
base_fields: []
mixins:
  - name: Audited
    fields:
      - {name: created_by, type: string}
      - {name: title, type: integer}
  - name: SoftDelete
    fields:
      - {name: deleted, type: boolean}
entities:
  - name: Product
    mixins: [SoftDelete, Audited]
    fields:
      - {name: title, type: string}
"#,
        )
        .unwrap();
        let product = cfg.entity("Product").unwrap();
        assert_eq!(field_names(product), ["title", "deleted", "created_by"]);
        assert_eq!(product.field("title").unwrap().field_type, FieldType::String);
    }

    #[test]
    fn unknown_mixin_is_rejected() {
        let err = parse(
            "name: Shop\nentities:\n  - name: P\n    mixins: [Nope]\n    fields:\n      - {name: t, type: string}\n",
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::UndefinedMixin { .. }));
    }

    #[test]
    fn relationship_to_undefined_entity_fails() {
        let err = parse(
            r#"
name: Sales
entities:
  - name: Order
    fields: [{name: total, type: float}]
    relationships:
      - {target: Customer, type: many_to_one}
"#,
        )
        .unwrap_err();
        match err {
            DomainError::UndefinedEntity { path, target } => {
                assert_eq!(target, "Customer");
                assert_eq!(path, "entities[0].relationships[0].target");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn domain_relationships_are_spliced_without_duplicates() {
        let cfg = parse(
            r#"
name: Sales
relationships:
  - {source: Order, target: Customer, type: many_to_one, back_populates: orders}
  - {source: Order, target: Customer, type: many_to_one}
entities:
  - name: Order
    fields: [{name: total, type: float}]
  - name: Customer
    fields: [{name: email, type: email}]
"#,
        )
        .unwrap();
        let order = cfg.entity("Order").unwrap();
        assert_eq!(order.relationships.len(), 1);
        assert_eq!(order.relationships[0].back_populates.as_deref(), Some("orders"));
    }

    #[test]
    fn domain_relationship_with_unknown_source_fails() {
        let err = parse(
            r#"
name: Sales
relationships:
  - {source: Invoice, target: Order, type: one_to_one}
entities:
  - name: Order
    fields: [{name: total, type: float}]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::UndefinedEntity { ref target, .. } if target == "Invoice"));
    }

    #[test]
    fn duplicate_entities_fail() {
        let err = parse(
            r#"
name: Sales
entities:
  - name: Order
    fields: [{name: total, type: float}]
  - name: Order
    fields: [{name: total, type: float}]
"#,
        )
        .unwrap_err();
        assert!(matches!(err, DomainError::DuplicateName { kind: "entity", .. }));
    }

    #[test]
    fn default_endpoints_need_entities() {
        let empty = parse("name: Sales\n").unwrap();
        assert!(empty.endpoints.is_empty());

        let cfg = parse(
            "name: Sales\nentities:\n  - name: Order\n    fields: [{name: total, type: float}]\n",
        )
        .unwrap();
        let summary: Vec<(&str, HttpMethod, &str)> = cfg
            .endpoints
            .iter()
            .map(|e| (e.name.as_str(), e.method, e.path.as_str()))
            .collect();
        assert_eq!(
            summary,
            [
                ("create", HttpMethod::Post, "/"),
                ("get_by_id", HttpMethod::Get, "/{id}"),
                ("list", HttpMethod::Get, "/"),
                ("update", HttpMethod::Put, "/{id}"),
                ("delete", HttpMethod::Delete, "/{id}"),
            ]
        );
    }

    #[test]
    fn declared_endpoints_are_not_replaced() {
        let cfg = parse(
            r#"
name: Sales
endpoints:
  - {name: checkout, method: POST, path: /checkout}
entities:
  - name: Order
    fields: [{name: total, type: float}]
"#,
        )
        .unwrap();
        assert_eq!(cfg.endpoints.len(), 1);
        assert_eq!(cfg.endpoints[0].name, "checkout");
    }

    #[test]
    fn unknown_top_level_key_rejected() {
        assert!(parse("name: Sales\nflavour: spicy\n").is_err());
    }

    #[test]
    fn domain_entity_name_collision_is_a_warning() {
        let cfg = parse(
            "name: Order\nentities:\n  - name: Order\n    fields: [{name: total, type: float}]\n",
        )
        .unwrap();
        assert_eq!(cfg.warnings().len(), 1);
    }
}
