//! Template Linter - checks preservation markers across a template tree.

use std::path::{Path, PathBuf};
use tracing::{debug, instrument};

use crate::{
    application::ports::Filesystem,
    domain::{markers, paths, DomainError},
    error::PyhexResult,
};

/// Marker defects of one template file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintFinding {
    pub path: PathBuf,
    pub defects: Vec<DomainError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LintReport {
    pub checked: usize,
    pub findings: Vec<LintFinding>,
}

impl LintReport {
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    pub fn defect_count(&self) -> usize {
        self.findings.iter().map(|f| f.defects.len()).sum()
    }
}

pub struct TemplateLinter<'a> {
    fs: &'a dyn Filesystem,
}

impl<'a> TemplateLinter<'a> {
    pub fn new(fs: &'a dyn Filesystem) -> Self {
        Self { fs }
    }

    /// Scan every `.j2` file under `root` for marker defects.
    #[instrument(skip(self, root), fields(root = %root.display()))]
    pub fn lint_templates(&self, root: &Path) -> PyhexResult<LintReport> {
        let mut report = LintReport::default();
        for path in self.fs.list_files_recursive(root)? {
            if !paths::is_template(&path) {
                continue;
            }
            report.checked += 1;
            let text = self.fs.read_to_string(&path)?;
            let defects = markers::lint_template(&text);
            if !defects.is_empty() {
                debug!(path = %path.display(), defects = defects.len(), "Marker defects");
                report.findings.push(LintFinding { path, defects });
            }
        }
        Ok(report)
    }
}
