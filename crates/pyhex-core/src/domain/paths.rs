//! Lexical path rules for template sources and generated output.

use std::path::{Component, Path, PathBuf};

use crate::domain::error::DomainError;

/// Template file suffix.
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Placeholder directory name used in template source trees.
pub const DOMAIN_PLACEHOLDER: &str = "{{domain}}";

/// Normalize `.` and `..` without touching the filesystem.
///
/// Returns `None` if `..` would climb above the start of the path.
pub fn normalize(path: &Path) -> Option<PathBuf> {
    let mut out = PathBuf::new();
    let mut depth = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if depth == 0 {
                    return None;
                }
                out.pop();
                depth -= 1;
            }
            Component::Normal(part) => {
                out.push(part);
                depth += 1;
            }
            Component::RootDir | Component::Prefix(_) => {
                out.push(component.as_os_str());
            }
        }
    }
    Some(out)
}

/// Resolve `path` against `base` and require the result to stay inside it.
///
/// A relative `path` is joined onto `base`; an absolute one is checked as is.
pub fn contained_in(base: &Path, path: &Path) -> Result<PathBuf, DomainError> {
    let escape = || DomainError::PathEscapesBase {
        path: path.display().to_string(),
        base: base.display().to_string(),
    };
    let base_norm = normalize(base).ok_or_else(escape)?;
    let joined = if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_norm.join(path)
    };
    let resolved = normalize(&joined).ok_or_else(escape)?;
    if resolved.starts_with(&base_norm) {
        Ok(resolved)
    } else {
        Err(escape())
    }
}

/// Output path of a template: `.j2` stripped and placed under `output_dir`.
///
/// `relative` is the template's path relative to its source directory.
pub fn output_path(output_dir: &Path, relative: &Path) -> PathBuf {
    let mut out = output_dir.join(relative);
    if let Some(name) = out.file_name().and_then(|n| n.to_str()) {
        if let Some(stem) = name.strip_suffix(TEMPLATE_SUFFIX) {
            let stem = stem.to_string();
            out.set_file_name(stem);
        }
    }
    out
}

/// Replace the `{{domain}}` placeholder in every path component.
pub fn substitute_placeholder(relative: &Path, value: &str) -> PathBuf {
    relative
        .components()
        .map(|c| {
            let part = c.as_os_str().to_string_lossy();
            if part.contains(DOMAIN_PLACEHOLDER) {
                PathBuf::from(part.replace(DOMAIN_PLACEHOLDER, value))
            } else {
                PathBuf::from(c.as_os_str())
            }
        })
        .collect()
}

pub fn is_template(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.ends_with(TEMPLATE_SUFFIX) && n.len() > TEMPLATE_SUFFIX.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_paths_resolve_inside_base() {
        let base = Path::new("/tpl/core");
        assert_eq!(
            contained_in(base, Path::new("models/entity.py.j2")).unwrap(),
            PathBuf::from("/tpl/core/models/entity.py.j2")
        );
        assert_eq!(
            contained_in(base, Path::new("a/../b.j2")).unwrap(),
            PathBuf::from("/tpl/core/b.j2")
        );
    }

    #[test]
    fn escapes_are_rejected() {
        let base = Path::new("/tpl/core");
        assert!(contained_in(base, Path::new("../service/x.j2")).is_err());
        assert!(contained_in(base, Path::new("/etc/passwd")).is_err());
        assert!(contained_in(base, Path::new("/tpl/core2/x.j2")).is_err());
    }

    #[test]
    fn output_strips_suffix_only_from_file_name() {
        let out = output_path(Path::new("src/core/Order"), Path::new("models/order.py.j2"));
        assert_eq!(out, PathBuf::from("src/core/Order/models/order.py"));
        let plain = output_path(Path::new("out"), Path::new("README.md"));
        assert_eq!(plain, PathBuf::from("out/README.md"));
    }

    #[test]
    fn placeholder_substitution() {
        assert_eq!(
            substitute_placeholder(Path::new("models/{{domain}}_model.py.j2"), "order"),
            PathBuf::from("models/order_model.py.j2")
        );
        assert_eq!(
            substitute_placeholder(Path::new("plain/file.py"), "order"),
            PathBuf::from("plain/file.py")
        );
    }

    #[test]
    fn template_detection() {
        assert!(is_template(Path::new("a/model.py.j2")));
        assert!(!is_template(Path::new("a/model.py")));
        assert!(!is_template(Path::new(".j2")));
    }
}
