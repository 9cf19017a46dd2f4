//! Preservation markers.
//!
//! Generated files may contain regions delimited by comment markers:
//!
//! ```text
//! # @pyhex:begin:custom_methods
//! ...hand-written code...
//! # @pyhex:end:custom_methods
//! ```
//!
//! On regeneration the body of every region that exists in both the old
//! file and the new render is taken from the old file. Marker lines
//! themselves always come from the new render.
//!
//! Template sources are linted before rendering, so a marker line may still
//! carry Jinja syntax (`# @pyhex:begin:{{ entity.snake_name }}_methods`).
//! [`lint_template`] normalises such lines first: `{% ... %}` tags are
//! removed and each `{{ ... }}` expression is replaced by its trimmed
//! source with non-name characters turned into `_`. Regions whose names
//! differ only at render time are therefore checked by their source text.

use std::collections::{HashMap, HashSet};

use crate::domain::error::DomainError;

pub const MARKER_PREFIX: &str = "@pyhex:";
pub const BEGIN_PREFIX: &str = "@pyhex:begin:";
pub const END_PREFIX: &str = "@pyhex:end:";

/// A closed, well-formed region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    pub name: String,
    /// 1-based line of the begin marker.
    pub begin_line: usize,
    /// 1-based line of the end marker.
    pub end_line: usize,
    /// Lines strictly between the markers, line endings included.
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Marker<'a> {
    Begin(&'a str),
    End(&'a str),
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.')
}

/// Classify one line. `Err` means the line mentions the marker prefix but
/// is not a well-formed begin or end marker.
fn classify(line: &str, line_no: usize) -> Result<Option<Marker<'_>>, DomainError> {
    let Some(at) = line.find(MARKER_PREFIX) else {
        return Ok(None);
    };
    let rest = &line[at..];
    let (tail, begin) = if let Some(tail) = rest.strip_prefix(BEGIN_PREFIX) {
        (tail, true)
    } else if let Some(tail) = rest.strip_prefix(END_PREFIX) {
        (tail, false)
    } else {
        return Err(DomainError::MalformedMarker { line: line_no });
    };
    let len = tail.find(|c: char| !is_name_char(c)).unwrap_or(tail.len());
    let name = &tail[..len];
    if name.is_empty() {
        return Err(DomainError::MalformedMarker { line: line_no });
    }
    Ok(Some(if begin {
        Marker::Begin(name)
    } else {
        Marker::End(name)
    }))
}

struct Scan {
    regions: Vec<Region>,
    defects: Vec<DomainError>,
}

fn scan_all(text: &str) -> Scan {
    let mut regions = Vec::new();
    let mut defects = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    let mut open: Option<(String, usize, String)> = None;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let marker = match classify(line, line_no) {
            Ok(m) => m,
            Err(e) => {
                defects.push(e);
                continue;
            }
        };
        match marker {
            None => {
                if let Some((_, _, body)) = open.as_mut() {
                    body.push_str(line);
                }
            }
            Some(Marker::Begin(inner)) if open.is_some() => {
                let outer = open.as_ref().map(|(n, _, _)| n.clone()).unwrap_or_default();
                defects.push(DomainError::NestedRegion {
                    outer,
                    inner: inner.to_string(),
                    line: line_no,
                });
            }
            Some(Marker::Begin(name)) => {
                if !seen.insert(name.to_string()) {
                    defects.push(DomainError::DuplicateRegion {
                        name: name.to_string(),
                        line: line_no,
                    });
                }
                open = Some((name.to_string(), line_no, String::new()));
            }
            Some(Marker::End(name)) => match open.take() {
                Some((current, begin_line, body)) if current == name => {
                    regions.push(Region {
                        name: current,
                        begin_line,
                        end_line: line_no,
                        body,
                    });
                }
                other => {
                    open = other;
                    defects.push(DomainError::UnmatchedEnd {
                        name: name.to_string(),
                        line: line_no,
                    });
                }
            },
        }
    }

    if let Some((name, line, _)) = open {
        defects.push(DomainError::UnclosedRegion { name, line });
    }
    Scan { regions, defects }
}

/// Parse all regions, failing on the first defect.
pub fn parse_regions(text: &str) -> Result<Vec<Region>, DomainError> {
    let scan = scan_all(text);
    match scan.defects.into_iter().next() {
        Some(defect) => Err(defect),
        None => Ok(scan.regions),
    }
}

/// Every marker defect in `text`, in line order.
pub fn lint(text: &str) -> Vec<DomainError> {
    scan_all(text).defects
}

/// Every marker defect in a template source, with Jinja tags and
/// expressions on marker lines normalised away first.
pub fn lint_template(source: &str) -> Vec<DomainError> {
    let normalised: String = source
        .split_inclusive('\n')
        .map(|line| {
            if line.contains(MARKER_PREFIX) && (line.contains("{{") || line.contains("{%")) {
                strip_jinja(line)
            } else {
                line.to_string()
            }
        })
        .collect();
    lint(&normalised)
}

fn strip_jinja(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut rest = line;
    loop {
        let next = [("{{", "}}"), ("{%", "%}")]
            .into_iter()
            .filter_map(|(open, close)| rest.find(open).map(|at| (at, open, close)))
            .min_by_key(|(at, _, _)| *at);
        let Some((at, open, close)) = next else {
            break;
        };
        let after = &rest[at + open.len()..];
        let Some(end) = after.find(close) else {
            break;
        };
        out.push_str(&rest[..at]);
        if open == "{{" {
            let expr = after[..end].trim_matches(|c: char| c == '-' || c.is_whitespace());
            out.extend(expr.chars().map(|c| if is_name_char(c) { c } else { '_' }));
        }
        rest = &after[end + close.len()..];
    }
    out.push_str(rest);
    out
}

/// Outcome of carrying preserved regions into a fresh render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preserved {
    pub content: String,
    /// Regions of the old file that the new render no longer declares.
    pub dropped: Vec<String>,
}

/// Merge the preserved regions of `existing` into `rendered`.
///
/// Both inputs must be well-formed; a broken `existing` file is never
/// overwritten by the caller.
pub fn preserve_regions(existing: &str, rendered: &str) -> Result<Preserved, DomainError> {
    let old = parse_regions(existing)?;
    let new = parse_regions(rendered)?;

    let old_bodies: HashMap<&str, &str> = old
        .iter()
        .map(|r| (r.name.as_str(), r.body.as_str()))
        .collect();
    let new_names: HashSet<&str> = new.iter().map(|r| r.name.as_str()).collect();

    let mut content = String::with_capacity(rendered.len());
    let mut skipping = false;
    for (idx, line) in rendered.split_inclusive('\n').enumerate() {
        match classify(line, idx + 1)? {
            Some(Marker::Begin(name)) => {
                content.push_str(line);
                if let Some(body) = old_bodies.get(name) {
                    content.push_str(body);
                    skipping = true;
                }
            }
            Some(Marker::End(_)) => {
                skipping = false;
                content.push_str(line);
            }
            None if skipping => {}
            None => content.push_str(line),
        }
    }

    let dropped = old
        .iter()
        .filter(|r| !new_names.contains(r.name.as_str()))
        .map(|r| r.name.clone())
        .collect();

    Ok(Preserved { content, dropped })
}

#[cfg(test)]
mod tests {
    use super::*;

    const RENDERED: &str = "class Order:\n    # @pyhex:begin:methods\n    pass\n    # @pyhex:end:methods\n";

    #[test]
    fn parses_regions_with_bodies() {
        let regions = parse_regions(RENDERED).unwrap();
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].name, "methods");
        assert_eq!(regions[0].begin_line, 2);
        assert_eq!(regions[0].end_line, 4);
        assert_eq!(regions[0].body, "    pass\n");
    }

    #[test]
    fn keeps_user_body_on_regeneration() {
        let existing = "class Order:\n    # @pyhex:begin:methods\n    def total(self):\n        return 1\n    # @pyhex:end:methods\n";
        let fresh = RENDERED.replace("class Order:", "class Order(SQLModel):");
        let merged = preserve_regions(existing, &fresh).unwrap();
        assert!(merged.content.starts_with("class Order(SQLModel):\n"));
        assert!(merged.content.contains("def total(self):"));
        assert!(!merged.content.contains("    pass\n"));
        assert!(merged.dropped.is_empty());
    }

    #[test]
    fn new_regions_keep_rendered_body() {
        let merged = preserve_regions("class Order:\n", RENDERED).unwrap();
        assert_eq!(merged.content, RENDERED);
    }

    #[test]
    fn reports_dropped_regions() {
        let existing = "# @pyhex:begin:imports\nimport os\n# @pyhex:end:imports\n";
        let merged = preserve_regions(existing, RENDERED).unwrap();
        assert_eq!(merged.dropped, ["imports"]);
    }

    #[test]
    fn detects_unclosed_region() {
        let err = parse_regions("# @pyhex:begin:a\nbody\n").unwrap_err();
        assert_eq!(
            err,
            DomainError::UnclosedRegion {
                name: "a".into(),
                line: 1
            }
        );
    }

    #[test]
    fn detects_mismatched_end() {
        let err = parse_regions("# @pyhex:begin:a\n# @pyhex:end:b\n").unwrap_err();
        assert!(matches!(err, DomainError::UnmatchedEnd { ref name, line: 2 } if name == "b"));
    }

    #[test]
    fn detects_nesting_and_duplicates() {
        let nested = "# @pyhex:begin:a\n# @pyhex:begin:b\n# @pyhex:end:b\n# @pyhex:end:a\n";
        assert!(matches!(
            parse_regions(nested).unwrap_err(),
            DomainError::NestedRegion { .. }
        ));

        let dup = "# @pyhex:begin:a\n# @pyhex:end:a\n# @pyhex:begin:a\n# @pyhex:end:a\n";
        assert!(matches!(
            parse_regions(dup).unwrap_err(),
            DomainError::DuplicateRegion { line: 3, .. }
        ));
    }

    #[test]
    fn malformed_markers() {
        assert!(matches!(
            parse_regions("# @pyhex:start:a\n").unwrap_err(),
            DomainError::MalformedMarker { line: 1 }
        ));
        assert!(matches!(
            parse_regions("# @pyhex:begin:\n").unwrap_err(),
            DomainError::MalformedMarker { line: 1 }
        ));
    }

    #[test]
    fn lint_collects_every_defect() {
        let text = "# @pyhex:end:x\n# @pyhex:oops\n# @pyhex:begin:y\n";
        assert_eq!(lint(text).len(), 3);
        assert!(lint(RENDERED).is_empty());
    }

    #[test]
    fn templated_region_names_lint_clean() {
        let source = "class {{ entity.name }}:\n    # @pyhex:begin:{{ entity.snake_name }}_methods\n    pass\n    # @pyhex:end:{{ entity.snake_name }}_methods\n";
        assert!(lint_template(source).is_empty());

        let guarded = "{% if custom %}# @pyhex:begin:extra{% endif %}\n# @pyhex:end:extra\n";
        assert!(lint_template(guarded).is_empty());
    }

    #[test]
    fn templated_names_still_need_matching_ends() {
        let source = "# @pyhex:begin:{{ name }}_a\n# @pyhex:end:{{ name }}_b\n";
        assert!(matches!(
            lint_template(source).first(),
            Some(DomainError::UnmatchedEnd { name, line: 2 }) if name == "name_b"
        ));
        assert!(!lint_template("# @pyhex:begin:{{ x }}\n").is_empty());
    }

    #[test]
    fn handles_missing_trailing_newline() {
        let regions = parse_regions("# @pyhex:begin:a\nx\n# @pyhex:end:a").unwrap();
        assert_eq!(regions[0].body, "x\n");
    }
}
