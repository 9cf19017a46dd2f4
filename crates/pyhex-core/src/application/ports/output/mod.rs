//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the application needs from external systems.
//! The `pyhex-adapters` crate provides implementations.

use crate::domain::TemplateContext;
use crate::error::PyhexResult;
use std::path::{Path, PathBuf};

/// Port for filesystem operations.
///
/// Implemented by:
/// - `pyhex_adapters::filesystem::LocalFilesystem` (production)
/// - `pyhex_adapters::filesystem::MemoryFilesystem` (testing)
///
/// Listings are returned sorted so every caller iterates deterministically.
pub trait Filesystem: Send + Sync {
    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> PyhexResult<()>;

    /// Write content to a file, replacing it if present.
    fn write_file(&self, path: &Path, content: &str) -> PyhexResult<()>;

    /// Create a file only if it does not exist yet.
    ///
    /// Returns `Ok(false)` without touching the file when it already exists.
    fn create_new(&self, path: &Path, content: &str) -> PyhexResult<bool>;

    fn read_to_string(&self, path: &Path) -> PyhexResult<String>;

    /// Check if path exists.
    fn exists(&self, path: &Path) -> bool;

    fn is_dir(&self, path: &Path) -> bool;

    /// Immediate subdirectories of `path`, sorted.
    fn list_dirs(&self, path: &Path) -> PyhexResult<Vec<PathBuf>>;

    /// Every file beneath `path` at any depth, sorted.
    fn list_files_recursive(&self, path: &Path) -> PyhexResult<Vec<PathBuf>>;

    fn remove_file(&self, path: &Path) -> PyhexResult<()>;
}

/// Port for template rendering.
///
/// Implemented by:
/// - `pyhex_adapters::renderer::MiniJinjaRenderer` (Jinja syntax via MiniJinja)
pub trait TemplateRenderer: Send + Sync {
    /// Render template `source` against `context`.
    ///
    /// `name` identifies the template in error messages.
    fn render(&self, name: &str, source: &str, context: &TemplateContext) -> PyhexResult<String>;
}
