//! Template context: the flat, serializable view templates render from.
//!
//! Building a context is pure. The timestamp is passed in, so the same
//! config, name and timestamp always give the same context.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::{
    config::{
        EndpointConfig, EntityConfig, EntityDomainConfig, FieldConfig, LayerPayload,
        RelationshipConfig,
    },
    error::DomainError,
    naming,
    value_objects::Layer,
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldView {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub python_type: String,
    pub required: bool,
    pub index: bool,
    pub unique: bool,
    /// Python source of the default, if any.
    pub default: Option<String>,
    /// The default names a callable and belongs in `default_factory`.
    pub default_factory: bool,
    pub description: Option<String>,
}

impl From<&FieldConfig> for FieldView {
    fn from(field: &FieldConfig) -> Self {
        Self {
            name: field.name.clone(),
            field_type: field.field_type.to_string(),
            python_type: field.field_type.python_type(),
            required: field.required,
            index: field.index,
            unique: field.unique,
            default: field.default.as_ref().map(|d| d.to_python()),
            default_factory: field.default.as_ref().is_some_and(|d| d.is_factory()),
            description: field.description.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationshipView {
    pub target: String,
    pub kind: String,
    pub is_collection: bool,
    pub back_populates: Option<String>,
    pub foreign_key: Option<String>,
}

impl From<&RelationshipConfig> for RelationshipView {
    fn from(rel: &RelationshipConfig) -> Self {
        Self {
            target: rel.target.clone(),
            kind: rel.kind.as_str().to_string(),
            is_collection: rel.kind.is_collection(),
            back_populates: rel.back_populates.clone(),
            foreign_key: rel.foreign_key.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityView {
    pub name: String,
    pub snake_name: String,
    pub plural_name: String,
    pub table_name: String,
    pub description: Option<String>,
    pub fields: Vec<FieldView>,
    pub relationships: Vec<RelationshipView>,
}

impl From<&EntityConfig> for EntityView {
    fn from(entity: &EntityConfig) -> Self {
        Self {
            name: entity.name.clone(),
            snake_name: naming::to_snake_case(&entity.name),
            plural_name: naming::pluralize(&entity.name),
            table_name: entity.table_name(),
            description: entity.description.clone(),
            fields: entity.fields.iter().map(FieldView::from).collect(),
            relationships: entity.relationships.iter().map(RelationshipView::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateContext {
    pub layer: Layer,
    pub domain: String,
    pub package_name: String,
    pub plural_name: String,
    pub description: Option<String>,
    pub entities: Vec<EntityView>,
    pub endpoints: Vec<EndpointConfig>,
    /// Layer-specific extras (methods, dependencies, business rules, API settings).
    pub metadata: BTreeMap<String, serde_yaml::Value>,
    pub generated_at: DateTime<Utc>,
}

fn to_value<T: Serialize>(key: &str, value: &T) -> Result<serde_yaml::Value, DomainError> {
    serde_yaml::to_value(value)
        .map_err(|e| DomainError::validation(format!("metadata.{key}"), e.to_string()))
}

impl TemplateContext {
    /// Build the context for one layer of `name`.
    ///
    /// `core` supplies entities and endpoints to the non-core layers; when
    /// it is absent those lists are empty (or come from the payload itself).
    pub fn build(
        payload: &LayerPayload,
        name: &str,
        core: Option<&EntityDomainConfig>,
        generated_at: DateTime<Utc>,
    ) -> Result<Self, DomainError> {
        let core = match payload {
            LayerPayload::Core(domain) => Some(domain),
            _ => core,
        };

        let mut ctx = Self {
            layer: payload.layer(),
            domain: core.map_or_else(|| name.to_string(), |d| d.name.clone()),
            package_name: core
                .map_or_else(|| naming::to_snake_case(name), |d| d.package_name.clone()),
            plural_name: core.map_or_else(|| naming::pluralize(name), |d| d.plural_name.clone()),
            description: core.and_then(|d| d.description.clone()),
            entities: core
                .map(|d| d.entities.iter().map(EntityView::from).collect())
                .unwrap_or_default(),
            endpoints: core.map(|d| d.endpoints.clone()).unwrap_or_default(),
            metadata: BTreeMap::new(),
            generated_at,
        };

        match payload {
            LayerPayload::Core(domain) => {
                ctx.insert("sqlmodel_config", &domain.sqlmodel_config)?;
                let mixins: Vec<&str> = domain.mixins.iter().map(|m| m.name.as_str()).collect();
                ctx.insert("mixins", &mixins)?;
            }
            LayerPayload::Repository(repo) => {
                ctx.entities.retain(|e| repo.covers(&e.name));
                ctx.override_description(&repo.description);
                ctx.insert("repository", repo)?;
                ctx.insert("methods", &repo.methods)?;
                ctx.insert("storage", &repo.storage)?;
            }
            LayerPayload::UseCase(usecase) => {
                ctx.override_description(&usecase.description);
                ctx.insert("usecase", usecase)?;
                ctx.insert("methods", &usecase.methods)?;
                ctx.insert("dependencies", &usecase.dependencies)?;
                ctx.insert("business_rules", &usecase.business_rules)?;
                ctx.insert("validation", &usecase.validation)?;
                ctx.insert("constraints", &usecase.constraints)?;
                ctx.insert("rules", &usecase.rules)?;
            }
            LayerPayload::Service(service) => {
                ctx.override_description(&service.description);
                ctx.insert("service", service)?;
                ctx.insert("methods", &service.methods)?;
                ctx.insert("dependencies", &service.dependencies)?;
                ctx.insert("usecases", &service.usecases)?;
            }
            LayerPayload::Interface(interface) => {
                if !interface.endpoints.is_empty() {
                    ctx.endpoints = interface.endpoints.clone();
                }
                ctx.override_description(&interface.description);
                ctx.insert("interface", interface)?;
                ctx.insert("api", &interface.api)?;
            }
        }
        Ok(ctx)
    }

    fn insert<T: Serialize>(&mut self, key: &str, value: &T) -> Result<(), DomainError> {
        self.metadata.insert(key.to_string(), to_value(key, value)?);
        Ok(())
    }

    fn override_description(&mut self, description: &Option<String>) {
        if description.is_some() {
            self.description = description.clone();
        }
    }
}
