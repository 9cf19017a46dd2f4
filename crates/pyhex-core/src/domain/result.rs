//! The observable outcome of one generation operation.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use uuid::Uuid;

/// How a rendered file landed on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteOutcome {
    /// The file did not exist before.
    Generated,
    /// The file existed and its content changed.
    Modified,
    /// The file existed with identical content; nothing was written.
    Skipped,
}

/// Accumulated result of a generation call.
///
/// Errors flip `success`; warnings never do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationResult {
    pub run_id: Uuid,
    pub success: bool,
    pub generated: Vec<PathBuf>,
    pub modified: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
    pub metadata: BTreeMap<String, String>,
}

impl Default for GenerationResult {
    fn default() -> Self {
        Self::new()
    }
}

impl GenerationResult {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            success: true,
            generated: Vec::new(),
            modified: Vec::new(),
            skipped: Vec::new(),
            errors: Vec::new(),
            warnings: Vec::new(),
            metadata: BTreeMap::new(),
        }
    }

    pub fn add_error(&mut self, message: impl Into<String>) {
        self.success = false;
        self.errors.push(message.into());
    }

    pub fn add_warning(&mut self, message: impl Into<String>) {
        self.warnings.push(message.into());
    }

    pub fn record(&mut self, outcome: WriteOutcome, path: PathBuf) {
        match outcome {
            WriteOutcome::Generated => self.generated.push(path),
            WriteOutcome::Modified => self.modified.push(path),
            WriteOutcome::Skipped => self.skipped.push(path),
        }
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Files written by this run (generated plus modified).
    pub fn written(&self) -> usize {
        self.generated.len() + self.modified.len()
    }

    /// Fold a child result (one layer or one domain) into this one.
    ///
    /// Lists are appended; existing metadata keys win.
    pub fn merge(&mut self, other: GenerationResult) {
        self.success &= other.success;
        self.generated.extend(other.generated);
        self.modified.extend(other.modified);
        self.skipped.extend(other.skipped);
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
        for (k, v) in other.metadata {
            self.metadata.entry(k).or_insert(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_flip_success_warnings_do_not() {
        let mut result = GenerationResult::new();
        result.add_warning("registry stale");
        assert!(result.success);
        result.add_error("template failed");
        assert!(!result.success);
    }

    #[test]
    fn merge_accumulates() {
        let mut parent = GenerationResult::new().with_metadata("layer", "core");
        parent.record(WriteOutcome::Generated, "a.py".into());

        let mut child = GenerationResult::new().with_metadata("layer", "service");
        child.record(WriteOutcome::Skipped, "b.py".into());
        child.add_error("boom");

        parent.merge(child);
        assert!(!parent.success);
        assert_eq!(parent.generated.len(), 1);
        assert_eq!(parent.skipped.len(), 1);
        assert_eq!(parent.errors, ["boom"]);
        assert_eq!(parent.metadata["layer"], "core");
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(GenerationResult::new().run_id, GenerationResult::new().run_id);
    }
}
