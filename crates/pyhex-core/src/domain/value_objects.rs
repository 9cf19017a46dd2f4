//! Domain value objects: Layer, DomainStatus, FieldType, RelationshipKind, HttpMethod.
//!
//! # Design
//!
//! These are pure value types: equality by value, no identity. This file's
//! only job is to define the types, their string representations, and their
//! `FromStr` parsers. Serde goes through the same string forms so YAML and
//! the CLI accept identical spellings.

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Layer ────────────────────────────────────────────────────────────────────

/// One architectural tier of generated output.
///
/// Declaration order is dependency order: generation always runs
/// core → repository → usecase → service → interface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layer {
    Core,
    Repository,
    UseCase,
    Service,
    Interface,
}

impl Layer {
    /// All layers in dependency order.
    pub const ALL: [Self; 5] = [
        Self::Core,
        Self::Repository,
        Self::UseCase,
        Self::Service,
        Self::Interface,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Repository => "repository",
            Self::UseCase => "usecase",
            Self::Service => "service",
            Self::Interface => "interface",
        }
    }

    /// Directory name of this layer under the project's layers dir.
    pub const fn dir_name(&self) -> &'static str {
        self.as_str()
    }

    /// Conventional config filenames of a domain in this layer.
    pub const fn config_files(&self) -> &'static [&'static str] {
        match self {
            Self::Core => &["domain.yaml", "entities.yaml"],
            Self::Repository => &["repository.yaml"],
            Self::UseCase => &["usecase.yaml", "business-rules.yaml"],
            Self::Service => &["service.yaml"],
            Self::Interface => &["interface.yaml"],
        }
    }

    /// Filenames whose presence marks a domain as `configured`.
    ///
    /// Core counts either of its two files; use case needs `usecase.yaml`
    /// because `business-rules.yaml` alone cannot be loaded.
    pub const fn status_files(&self) -> &'static [&'static str] {
        match self {
            Self::Core => &["domain.yaml", "entities.yaml"],
            Self::Repository => &["repository.yaml"],
            Self::UseCase => &["usecase.yaml"],
            Self::Service => &["service.yaml"],
            Self::Interface => &["interface.yaml"],
        }
    }

    pub const fn description(&self) -> &'static str {
        match self {
            Self::Core => "Domain entities and value objects",
            Self::Repository => "Persistence adapters for domain entities",
            Self::UseCase => "Application use cases and business rules",
            Self::Service => "Services composing use cases",
            Self::Interface => "HTTP API routers and schemas",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layer {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "core" | "domain" => Ok(Self::Core),
            "repository" | "repo" => Ok(Self::Repository),
            "usecase" | "use_case" | "use-case" => Ok(Self::UseCase),
            "service" => Ok(Self::Service),
            "interface" | "api" => Ok(Self::Interface),
            other => Err(DomainError::validation(
                "layer",
                format!("unknown layer: {other}"),
            )),
        }
    }
}

// ── DomainStatus ─────────────────────────────────────────────────────────────

/// Lifecycle of a domain inside one layer's registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DomainStatus {
    /// Directory exists, no config file yet.
    #[default]
    Blank,
    /// Config files present on disk.
    Configured,
    /// At least one successful generation pass.
    Generated,
}

impl DomainStatus {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Blank => "blank",
            Self::Configured => "configured",
            Self::Generated => "generated",
        }
    }

    /// Whether a regeneration batch should include this domain.
    pub const fn is_generatable(self) -> bool {
        matches!(self, Self::Configured | Self::Generated)
    }
}

impl fmt::Display for DomainStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DomainStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "blank" => Ok(Self::Blank),
            "configured" => Ok(Self::Configured),
            "generated" => Ok(Self::Generated),
            other => Err(DomainError::validation(
                "status",
                format!("unknown domain status: {other}"),
            )),
        }
    }
}

// ── FieldType ────────────────────────────────────────────────────────────────

/// Semantic type of an entity field.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum FieldType {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Email,
    Uuid,
    Bytes,
    Optional(Box<FieldType>),
    List(Box<FieldType>),
}

impl FieldType {
    /// Python annotation emitted into generated models.
    pub fn python_type(&self) -> String {
        match self {
            Self::String => "str".into(),
            Self::Integer => "int".into(),
            Self::Float => "float".into(),
            Self::Boolean => "bool".into(),
            Self::Datetime => "datetime".into(),
            Self::Email => "EmailStr".into(),
            Self::Uuid => "UUID".into(),
            Self::Bytes => "bytes".into(),
            Self::Optional(inner) => format!("Optional[{}]", inner.python_type()),
            Self::List(inner) => format!("List[{}]", inner.python_type()),
        }
    }

    pub const fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    pub const fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => f.write_str("string"),
            Self::Integer => f.write_str("integer"),
            Self::Float => f.write_str("float"),
            Self::Boolean => f.write_str("boolean"),
            Self::Datetime => f.write_str("datetime"),
            Self::Email => f.write_str("email"),
            Self::Uuid => f.write_str("uuid"),
            Self::Bytes => f.write_str("bytes"),
            Self::Optional(inner) => write!(f, "optional[{inner}]"),
            Self::List(inner) => write!(f, "list[{inner}]"),
        }
    }
}

impl FromStr for FieldType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let raw = s.trim();
        let lower = raw.to_ascii_lowercase();

        for (prefix, wrap) in [
            ("optional[", Self::Optional as fn(Box<FieldType>) -> FieldType),
            ("list[", Self::List as fn(Box<FieldType>) -> FieldType),
        ] {
            if let Some(inner) = lower
                .strip_prefix(prefix)
                .and_then(|rest| rest.strip_suffix(']'))
            {
                return Ok(wrap(Box::new(inner.parse()?)));
            }
        }

        match lower.as_str() {
            "string" | "str" => Ok(Self::String),
            "integer" | "int" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" | "bool" => Ok(Self::Boolean),
            "datetime" => Ok(Self::Datetime),
            "email" => Ok(Self::Email),
            "uuid" => Ok(Self::Uuid),
            "bytes" => Ok(Self::Bytes),
            _ => Err(DomainError::UnknownFieldType {
                path: "type".into(),
                value: raw.to_string(),
            }),
        }
    }
}

impl TryFrom<String> for FieldType {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<FieldType> for String {
    fn from(value: FieldType) -> Self {
        value.to_string()
    }
}

// ── RelationshipKind ─────────────────────────────────────────────────────────

/// Cardinality of a relationship between two entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

impl RelationshipKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneToOne => "one_to_one",
            Self::OneToMany => "one_to_many",
            Self::ManyToOne => "many_to_one",
            Self::ManyToMany => "many_to_many",
        }
    }

    /// Whether the owning side holds a collection.
    pub const fn is_collection(&self) -> bool {
        matches!(self, Self::OneToMany | Self::ManyToMany)
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── HttpMethod ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
