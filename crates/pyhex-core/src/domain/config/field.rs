//! Field definitions and default-value expressions.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::{error::DomainError, naming, value_objects::FieldType};

/// Default-value expressions that may be emitted verbatim into generated code.
pub const SAFE_DEFAULT_EXPRESSIONS: &[&str] = &[
    "None",
    "True",
    "False",
    "datetime.utcnow",
    "datetime.now",
    "uuid4",
    "uuid.uuid4",
    "list",
    "dict",
    "[]",
    "{}",
    "func.now()",
];

/// One column of an entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FieldConfig {
    pub name: String,
    #[serde(rename = "type")]
    pub field_type: FieldType,
    #[serde(default = "default_true")]
    pub required: bool,
    #[serde(default)]
    pub index: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl FieldConfig {
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            required: true,
            index: false,
            unique: false,
            default: None,
            description: None,
        }
    }

    pub fn indexed(mut self) -> Self {
        self.index = true;
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// Field-level validation: identifier rules and the default allow-list.
    pub fn validate(&self, path: &str) -> Result<(), DomainError> {
        if let Some(reason) = naming::member_name_violation(&self.name) {
            return Err(DomainError::InvalidIdentifier {
                path: format!("{path}.name"),
                reason,
            });
        }
        if let Some(default) = &self.default {
            default.validate(&format!("{path}.default"))?;
        }
        Ok(())
    }
}

/// A field's default value as written in YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Integer(i64),
    Float(f64),
    Expression(String),
}

impl DefaultValue {
    pub fn expression(expr: impl Into<String>) -> Self {
        Self::Expression(expr.into())
    }

    fn validate(&self, path: &str) -> Result<(), DomainError> {
        match self {
            Self::Expression(expr) if !is_safe_expression(expr) => {
                Err(DomainError::UnsafeDefault {
                    path: path.to_string(),
                    expression: expr.clone(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Python source for this default.
    pub fn to_python(&self) -> String {
        match self {
            Self::Bool(true) => "True".into(),
            Self::Bool(false) => "False".into(),
            Self::Integer(n) => n.to_string(),
            Self::Float(n) => format!("{n:?}"),
            Self::Expression(expr) => expr.clone(),
        }
    }

    /// Whether the expression names a callable (used as `default_factory`).
    pub fn is_factory(&self) -> bool {
        matches!(
            self,
            Self::Expression(expr)
                if matches!(expr.as_str(), "datetime.utcnow" | "datetime.now" | "uuid4" | "uuid.uuid4" | "list" | "dict")
        )
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_python())
    }
}

fn is_safe_expression(expr: &str) -> bool {
    let expr = expr.trim();
    if SAFE_DEFAULT_EXPRESSIONS.contains(&expr) {
        return true;
    }
    is_quoted_literal(expr)
}

fn is_quoted_literal(expr: &str) -> bool {
    ['\'', '"'].iter().any(|&q| {
        expr.len() >= 2
            && expr.starts_with(q)
            && expr.ends_with(q)
            && !expr[1..expr.len() - 1].contains(q)
            && !expr.contains('\\')
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_defaults_accepted() {
        for expr in ["None", "uuid4", "datetime.utcnow", "'pending'", "\"draft\"", "[]"] {
            assert!(is_safe_expression(expr), "{expr} should be safe");
        }
    }

    #[test]
    fn unsafe_defaults_rejected() {
        for expr in ["os.system('rm')", "pending", "'a' + 'b'", "__import__('os')", "'a\\'"] {
            assert!(!is_safe_expression(expr), "{expr} should be rejected");
        }
    }

    #[test]
    fn field_validation_reports_path() {
        let field = FieldConfig::new("_secret", FieldType::String);
        let err = field.validate("entities[0].fields[1]").unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidIdentifier { ref path, .. } if path == "entities[0].fields[1].name"
        ));
    }

    #[test]
    fn default_rendering() {
        assert_eq!(DefaultValue::Bool(true).to_python(), "True");
        assert_eq!(DefaultValue::Float(1.0).to_python(), "1.0");
        assert!(DefaultValue::expression("uuid4").is_factory());
        assert!(!DefaultValue::expression("None").is_factory());
    }

    #[test]
    fn field_yaml_defaults() {
        let field: FieldConfig = serde_yaml::from_str("name: total\ntype: float\n").unwrap();
        assert!(field.required);
        assert!(!field.index);
        assert_eq!(field.field_type, FieldType::Float);
    }

    #[test]
    fn field_rejects_unknown_keys() {
        let result: Result<FieldConfig, _> =
            serde_yaml::from_str("name: total\ntype: float\nprecision: 2\n");
        assert!(result.is_err());
    }
}
