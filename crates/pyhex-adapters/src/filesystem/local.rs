//! Local filesystem adapter using std::fs.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use pyhex_core::{
    application::{ports::Filesystem, ApplicationError},
    error::{PyhexError, PyhexResult},
};
use walkdir::WalkDir;

/// Production filesystem implementation using `std::fs`.
#[derive(Debug, Clone, Copy)]
pub struct LocalFilesystem;

impl LocalFilesystem {
    /// Create a new local filesystem adapter.
    pub fn new() -> Self {
        Self
    }
}

impl Default for LocalFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for LocalFilesystem {
    fn create_dir_all(&self, path: &Path) -> PyhexResult<()> {
        std::fs::create_dir_all(path).map_err(|e| map_io_error(path, e, "create directory"))
    }

    fn write_file(&self, path: &Path, content: &str) -> PyhexResult<()> {
        std::fs::write(path, content).map_err(|e| map_io_error(path, e, "write file"))
    }

    fn create_new(&self, path: &Path, content: &str) -> PyhexResult<bool> {
        let mut file = match OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
            Err(e) => return Err(map_io_error(path, e, "create file")),
        };
        file.write_all(content.as_bytes())
            .map_err(|e| map_io_error(path, e, "write file"))?;
        Ok(true)
    }

    fn read_to_string(&self, path: &Path) -> PyhexResult<String> {
        std::fs::read_to_string(path).map_err(|e| map_io_error(path, e, "read file"))
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn is_dir(&self, path: &Path) -> bool {
        path.is_dir()
    }

    fn list_dirs(&self, path: &Path) -> PyhexResult<Vec<PathBuf>> {
        let entries = std::fs::read_dir(path).map_err(|e| map_io_error(path, e, "list directory"))?;
        let mut dirs = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| map_io_error(path, e, "list directory"))?;
            if entry.path().is_dir() {
                dirs.push(entry.path());
            }
        }
        dirs.sort();
        Ok(dirs)
    }

    fn list_files_recursive(&self, path: &Path) -> PyhexResult<Vec<PathBuf>> {
        let mut files = Vec::new();
        for entry in WalkDir::new(path).min_depth(1).sort_by_file_name() {
            let entry = entry.map_err(|e| {
                let reason = format!("Failed to walk directory: {e}");
                PyhexError::from(ApplicationError::FilesystemError {
                    path: path.to_path_buf(),
                    reason,
                })
            })?;
            // Symlinks and other special types are not templates.
            if entry.file_type().is_file() {
                files.push(entry.into_path());
            }
        }
        files.sort();
        Ok(files)
    }

    fn remove_file(&self, path: &Path) -> PyhexResult<()> {
        std::fs::remove_file(path).map_err(|e| map_io_error(path, e, "remove file"))
    }
}

fn map_io_error(path: &Path, e: io::Error, operation: &str) -> PyhexError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: format!("Failed to {}: {}", operation, e),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn create_new_refuses_existing_file() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        let path = tmp.path().join("lock");

        assert!(fs.create_new(&path, "first").unwrap());
        assert!(!fs.create_new(&path, "second").unwrap());
        assert_eq!(fs.read_to_string(&path).unwrap(), "first");
    }

    #[test]
    fn listings_are_sorted() {
        let tmp = TempDir::new().unwrap();
        let fs = LocalFilesystem::new();
        for dir in ["b", "a", "c/nested"] {
            fs.create_dir_all(&tmp.path().join(dir)).unwrap();
        }
        fs.write_file(&tmp.path().join("c/nested/z.j2"), "").unwrap();
        fs.write_file(&tmp.path().join("a/y.j2"), "").unwrap();
        fs.write_file(&tmp.path().join("top.txt"), "").unwrap();

        let dirs = fs.list_dirs(tmp.path()).unwrap();
        let names: Vec<_> = dirs
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, ["a", "b", "c"]);

        let files = fs.list_files_recursive(tmp.path()).unwrap();
        let relative: Vec<_> = files
            .iter()
            .map(|p| p.strip_prefix(tmp.path()).unwrap().to_path_buf())
            .collect();
        assert_eq!(
            relative,
            [
                PathBuf::from("a/y.j2"),
                PathBuf::from("c/nested/z.j2"),
                PathBuf::from("top.txt")
            ]
        );
    }

    #[test]
    fn reading_missing_file_is_filesystem_error() {
        let tmp = TempDir::new().unwrap();
        let err = LocalFilesystem::new()
            .read_to_string(&tmp.path().join("absent.yaml"))
            .unwrap_err();
        assert!(err.to_string().contains("read file"));
    }
}
