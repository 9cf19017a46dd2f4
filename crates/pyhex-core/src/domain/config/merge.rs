//! Merging multi-file layer configs into one document.
//!
//! These functions operate on raw YAML values, before typed validation.
//! Reading the files is the config processor's job.

use serde_yaml::{Mapping, Value};

use crate::domain::error::DomainError;

/// Domain-level keys copied from `domain.yaml` even though they are not scalars.
pub const DOMAIN_ONLY_KEYS: &[&str] = &[
    "base_fields",
    "mixins",
    "relationships",
    "sqlmodel_config",
    "endpoints",
];

/// Sub-maps of `business-rules.yaml` that are dict-updated into the use case.
pub const RULE_MAP_KEYS: &[&str] = &["validation", "constraints", "rules"];

fn key(name: &str) -> Value {
    Value::String(name.to_string())
}

fn as_mapping<'a>(value: &'a Value, path: &str) -> Result<&'a Mapping, DomainError> {
    value
        .as_mapping()
        .ok_or_else(|| DomainError::validation(path, "expected a mapping at the top level"))
}

/// Merge `domain.yaml` and `entities.yaml` into one core document.
///
/// - Domain fields may sit at top level or under a nested `domain:` mapping.
/// - Scalar domain keys are copied as-is.
/// - [`DOMAIN_ONLY_KEYS`] are copied when present (nested wins over top level).
/// - `entities` is taken wholesale from the entities document, which may be a
///   bare list or a mapping with an `entities` key. Absent means empty.
pub fn merge_core_documents(
    domain: Option<&Value>,
    entities: Option<&Value>,
) -> Result<Value, DomainError> {
    let mut merged = Mapping::new();

    if let Some(doc) = domain.filter(|v| !v.is_null()) {
        let top = as_mapping(doc, "domain.yaml")?;
        let nested = top.get(key("domain")).and_then(Value::as_mapping);
        let fields = nested.unwrap_or(top);

        for (k, v) in fields {
            if !(v.is_sequence() || v.is_mapping()) {
                merged.insert(k.clone(), v.clone());
            }
        }
        for name in DOMAIN_ONLY_KEYS {
            let found = nested
                .and_then(|m| m.get(key(name)))
                .or_else(|| top.get(key(name)));
            if let Some(v) = found {
                merged.insert(key(name), v.clone());
            }
        }
    }

    let entity_list = match entities.filter(|v| !v.is_null()) {
        None => Value::Sequence(Vec::new()),
        Some(Value::Sequence(list)) => Value::Sequence(list.clone()),
        Some(Value::Mapping(map)) => map
            .get(key("entities"))
            .cloned()
            .unwrap_or_else(|| Value::Sequence(Vec::new())),
        Some(_) => {
            return Err(DomainError::validation(
                "entities",
                "expected a list of entities",
            ));
        }
    };
    merged.insert(key("entities"), entity_list);

    Ok(Value::Mapping(merged))
}

/// Overlay `business-rules.yaml` onto `usecase.yaml`.
///
/// The use case document is the base. `business_rules` is replaced by the
/// rules file's list, while `validation`, `constraints` and `rules` are
/// dict-updated key by key.
pub fn merge_usecase_documents(
    usecase: &Value,
    business_rules: Option<&Value>,
) -> Result<Value, DomainError> {
    let mut merged = as_mapping(usecase, "usecase.yaml")?.clone();

    let Some(rules_doc) = business_rules.filter(|v| !v.is_null()) else {
        return Ok(Value::Mapping(merged));
    };
    let rules = as_mapping(rules_doc, "business-rules.yaml")?;

    if let Some(list) = rules.get(key("business_rules")) {
        merged.insert(key("business_rules"), list.clone());
    }
    for name in RULE_MAP_KEYS {
        let Some(update) = rules.get(key(name)) else {
            continue;
        };
        let Some(update) = update.as_mapping() else {
            return Err(DomainError::validation(
                format!("business-rules.yaml.{name}"),
                "expected a mapping",
            ));
        };
        let mut base = merged
            .get(key(name))
            .and_then(Value::as_mapping)
            .cloned()
            .unwrap_or_default();
        for (k, v) in update {
            base.insert(k.clone(), v.clone());
        }
        merged.insert(key(name), Value::Mapping(base));
    }

    Ok(Value::Mapping(merged))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(text: &str) -> Value {
        serde_yaml::from_str(text).unwrap()
    }

    #[test]
    fn core_merge_unwraps_nested_domain() {
        let domain = yaml("domain:\n  name: Order\n  description: Orders\nbase_fields: []\n");
        let entities = yaml("entities:\n  - name: Order\n    fields: []\n");
        let merged = merge_core_documents(Some(&domain), Some(&entities)).unwrap();
        assert_eq!(merged["name"].as_str(), Some("Order"));
        assert_eq!(merged["description"].as_str(), Some("Orders"));
        assert!(merged["base_fields"].as_sequence().unwrap().is_empty());
        assert_eq!(merged["entities"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn core_merge_missing_files_yield_empty_parts() {
        let merged = merge_core_documents(None, None).unwrap();
        assert!(merged.get("name").is_none());
        assert!(merged["entities"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn core_merge_accepts_bare_entity_list() {
        let domain = yaml("name: Order\n");
        let entities = yaml("- name: Order\n  fields: []\n");
        let merged = merge_core_documents(Some(&domain), Some(&entities)).unwrap();
        assert_eq!(merged["entities"].as_sequence().unwrap().len(), 1);
    }

    #[test]
    fn core_merge_ignores_entities_in_domain_file() {
        let domain = yaml("name: Order\nentities:\n  - name: Stray\n");
        let merged = merge_core_documents(Some(&domain), None).unwrap();
        assert!(merged["entities"].as_sequence().unwrap().is_empty());
    }

    #[test]
    fn usecase_merge_dict_updates_rule_maps() {
        let usecase = yaml(
            "name: PlaceOrder\nvalidation:\n  total: positive\n  email: required\nbusiness_rules:\n  - name: old\n",
        );
        let rules = yaml(
            "business_rules:\n  - name: min_total\nvalidation:\n  total: non_negative\nconstraints:\n  max_items: 50\n",
        );
        let merged = merge_usecase_documents(&usecase, Some(&rules)).unwrap();
        assert_eq!(merged["validation"]["total"].as_str(), Some("non_negative"));
        assert_eq!(merged["validation"]["email"].as_str(), Some("required"));
        assert_eq!(merged["constraints"]["max_items"].as_u64(), Some(50));
        let names: Vec<&str> = merged["business_rules"]
            .as_sequence()
            .unwrap()
            .iter()
            .filter_map(|r| r["name"].as_str())
            .collect();
        assert_eq!(names, ["min_total"]);
    }

    #[test]
    fn usecase_merge_without_rules_is_identity() {
        let usecase = yaml("name: PlaceOrder\n");
        assert_eq!(merge_usecase_documents(&usecase, None).unwrap(), usecase);
    }

    #[test]
    fn non_mapping_documents_fail() {
        let list = yaml("- a\n- b\n");
        assert!(merge_core_documents(Some(&list), None).is_err());
        assert!(merge_usecase_documents(&list, None).is_err());
    }
}
