//! Naming rules shared by config validation and template filters.
//!
//! Every derived name (plural, package, table) flows through these functions,
//! so they must stay deterministic: the same input always yields the same
//! output, with no locale or state involved.

/// Python keywords that can never be used as generated identifiers.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Convert a name to snake_case.
///
/// Walks the name and inserts `_` before every uppercase letter that is not
/// at position 0, then lowercases the result.
///
/// | Input | Output |
/// |-------|--------|
/// | "Order" | "order" |
/// | "OrderItem" | "order_item" |
/// | "order_item" | "order_item" |
/// | "HTTPLog" | "h_t_t_p_log" |
pub fn to_snake_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (i, c) in name.chars().enumerate() {
        if c.is_uppercase() {
            if i != 0 {
                out.push('_');
            }
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a snake_case name to PascalCase.
///
/// Each underscore-separated word gets its first character uppercased and the
/// words are concatenated. The rest of each word keeps its casing, so already
/// PascalCase input passes through unchanged.
pub fn to_pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut word = String::with_capacity(w.len());
                    word.extend(first.to_uppercase());
                    word.push_str(chars.as_str());
                    word
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Simple English pluralization.
///
/// - ends in `y` → replace with `ies`
/// - ends in `s`, `sh`, `ch`, `x`, `z` → append `es`
/// - otherwise → append `s`
pub fn pluralize(word: &str) -> String {
    if word.is_empty() {
        return String::new();
    }
    if let Some(stem) = word.strip_suffix('y') {
        return format!("{stem}ies");
    }
    if ["s", "sh", "ch", "x", "z"]
        .iter()
        .any(|suffix| word.ends_with(suffix))
    {
        return format!("{word}es");
    }
    format!("{word}s")
}

/// Reason an identifier was rejected, or `None` if it is a valid identifier.
///
/// Valid means: non-empty, starts with an ASCII letter or `_`, continues with
/// ASCII alphanumerics or `_`, and is not a Python keyword.
pub fn identifier_violation(name: &str) -> Option<String> {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return Some("identifier cannot be empty".into());
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return Some(format!("'{name}' must start with a letter or underscore"));
    }
    if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || *c == '_')) {
        return Some(format!("'{name}' contains invalid character '{bad}'"));
    }
    if PYTHON_KEYWORDS.contains(&name) {
        return Some(format!("'{name}' is a reserved Python keyword"));
    }
    None
}

/// Rule for type-like names (entities, domains, use cases, services).
pub fn type_name_violation(name: &str) -> Option<String> {
    if let Some(reason) = identifier_violation(name) {
        return Some(reason);
    }
    if !name.starts_with(|c: char| c.is_ascii_uppercase()) {
        return Some(format!("'{name}' must start with an uppercase letter"));
    }
    None
}

/// Rule for member-like names (fields, methods).
pub fn member_name_violation(name: &str) -> Option<String> {
    if let Some(reason) = identifier_violation(name) {
        return Some(reason);
    }
    if name.starts_with('_') {
        return Some(format!("'{name}' must not start with an underscore"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snake_case_inserts_underscores_before_inner_capitals() {
        assert_eq!(to_snake_case("Order"), "order");
        assert_eq!(to_snake_case("OrderItem"), "order_item");
        assert_eq!(to_snake_case("order_item"), "order_item");
        assert_eq!(to_snake_case("HTTPLog"), "h_t_t_p_log");
        assert_eq!(to_snake_case(""), "");
    }

    #[test]
    fn pascal_case_capitalizes_each_word() {
        assert_eq!(to_pascal_case("order_item"), "OrderItem");
        assert_eq!(to_pascal_case("order"), "Order");
        assert_eq!(to_pascal_case("OrderItem"), "OrderItem");
        assert_eq!(to_pascal_case("__private__name"), "PrivateName");
    }

    #[test]
    fn pluralize_follows_english_heuristic() {
        assert_eq!(pluralize("Order"), "Orders");
        assert_eq!(pluralize("Category"), "Categories");
        assert_eq!(pluralize("Address"), "Addresses");
        assert_eq!(pluralize("Dish"), "Dishes");
        assert_eq!(pluralize("Match"), "Matches");
        assert_eq!(pluralize("Box"), "Boxes");
        assert_eq!(pluralize("Quiz"), "Quizes");
        assert_eq!(pluralize(""), "");
    }

    #[test]
    fn derivations_are_deterministic() {
        for name in ["Order", "OrderItem", "Category", "Box"] {
            assert_eq!(to_snake_case(name), to_snake_case(name));
            assert_eq!(pluralize(name), pluralize(name));
        }
    }

    #[test]
    fn identifiers() {
        assert!(identifier_violation("total").is_none());
        assert!(identifier_violation("_hidden").is_none());
        assert!(identifier_violation("1st").is_some());
        assert!(identifier_violation("with-dash").is_some());
        assert!(identifier_violation("class").is_some());
        assert!(identifier_violation("").is_some());
    }

    #[test]
    fn type_and_member_rules() {
        assert!(type_name_violation("Order").is_none());
        assert!(type_name_violation("order").is_some());
        assert!(member_name_violation("total").is_none());
        assert!(member_name_violation("_total").is_some());
    }
}
