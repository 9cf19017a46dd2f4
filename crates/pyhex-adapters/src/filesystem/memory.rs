//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use pyhex_core::{
    application::{ports::Filesystem, ApplicationError},
    error::{PyhexError, PyhexResult},
};

/// In-memory filesystem for testing.
///
/// Clones share the same storage, so a test can keep a handle while the
/// services own another.
#[derive(Debug, Clone)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, String>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(MemoryFilesystemInner::default())),
        }
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner.files.get(path).cloned()
    }

    /// Create parent directories and write a file in one step (testing helper).
    pub fn seed(&self, path: impl AsRef<Path>, content: &str) -> PyhexResult<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            self.create_dir_all(parent)?;
        }
        self.write_file(path, content)
    }

    /// List all files, sorted.
    pub fn list_files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Clear all contents.
    pub fn clear(&self) {
        if let Ok(mut inner) = self.inner.write() {
            inner.files.clear();
            inner.directories.clear();
        }
    }

    fn read_guard(&self, path: &Path) -> PyhexResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned(path))
    }

    fn write_guard(&self, path: &Path) -> PyhexResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| poisoned(path))
    }
}

impl Default for MemoryFilesystem {
    fn default() -> Self {
        Self::new()
    }
}

impl Filesystem for MemoryFilesystem {
    fn create_dir_all(&self, path: &Path) -> PyhexResult<()> {
        let mut inner = self.write_guard(path)?;

        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            if inner.files.contains_key(&current) {
                return Err(not_found(&current, "A file exists at this path"));
            }
            inner.directories.insert(current.clone());
        }

        Ok(())
    }

    fn write_file(&self, path: &Path, content: &str) -> PyhexResult<()> {
        let mut inner = self.write_guard(path)?;
        ensure_parent(&inner, path)?;
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(())
    }

    fn create_new(&self, path: &Path, content: &str) -> PyhexResult<bool> {
        let mut inner = self.write_guard(path)?;
        if inner.files.contains_key(path) {
            return Ok(false);
        }
        ensure_parent(&inner, path)?;
        inner.files.insert(path.to_path_buf(), content.to_string());
        Ok(true)
    }

    fn read_to_string(&self, path: &Path) -> PyhexResult<String> {
        let inner = self.read_guard(path)?;
        inner
            .files
            .get(path)
            .cloned()
            .ok_or_else(|| not_found(path, "File does not exist"))
    }

    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn is_dir(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn list_dirs(&self, path: &Path) -> PyhexResult<Vec<PathBuf>> {
        let inner = self.read_guard(path)?;
        if !inner.directories.contains(path) {
            return Err(not_found(path, "Directory does not exist"));
        }
        Ok(inner
            .directories
            .iter()
            .filter(|d| d.parent() == Some(path))
            .cloned()
            .collect())
    }

    fn list_files_recursive(&self, path: &Path) -> PyhexResult<Vec<PathBuf>> {
        let inner = self.read_guard(path)?;
        if !inner.directories.contains(path) {
            return Err(not_found(path, "Directory does not exist"));
        }
        Ok(inner
            .files
            .keys()
            .filter(|f| f.starts_with(path) && f.as_path() != path)
            .cloned()
            .collect())
    }

    fn remove_file(&self, path: &Path) -> PyhexResult<()> {
        let mut inner = self.write_guard(path)?;
        inner
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path, "File does not exist"))
    }
}

fn ensure_parent(inner: &MemoryFilesystemInner, path: &Path) -> PyhexResult<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() && !inner.directories.contains(parent) => {
            Err(not_found(path, "Parent directory does not exist"))
        }
        _ => Ok(()),
    }
}

fn not_found(path: &Path, reason: &str) -> PyhexError {
    ApplicationError::FilesystemError {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
    .into()
}

fn poisoned(path: &Path) -> PyhexError {
    not_found(path, "Memory filesystem lock poisoned")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_requires_parent_directory() {
        let fs = MemoryFilesystem::new();
        assert!(fs.write_file(Path::new("/p/a.txt"), "x").is_err());

        fs.create_dir_all(Path::new("/p")).unwrap();
        fs.write_file(Path::new("/p/a.txt"), "x").unwrap();
        assert_eq!(fs.read_file(Path::new("/p/a.txt")).as_deref(), Some("x"));
    }

    #[test]
    fn create_new_is_exclusive() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/p")).unwrap();
        assert!(fs.create_new(Path::new("/p/lock"), "1").unwrap());
        assert!(!fs.create_new(Path::new("/p/lock"), "2").unwrap());
        assert_eq!(fs.read_file(Path::new("/p/lock")).as_deref(), Some("1"));

        fs.remove_file(Path::new("/p/lock")).unwrap();
        assert!(fs.create_new(Path::new("/p/lock"), "3").unwrap());
    }

    #[test]
    fn list_dirs_returns_immediate_children_only() {
        let fs = MemoryFilesystem::new();
        fs.create_dir_all(Path::new("/root/b/deep")).unwrap();
        fs.create_dir_all(Path::new("/root/a")).unwrap();

        let dirs = fs.list_dirs(Path::new("/root")).unwrap();
        assert_eq!(dirs, [PathBuf::from("/root/a"), PathBuf::from("/root/b")]);
    }

    #[test]
    fn list_files_recursive_is_sorted_and_scoped() {
        let fs = MemoryFilesystem::new();
        fs.seed("/t/z.j2", "").unwrap();
        fs.seed("/t/sub/a.j2", "").unwrap();
        fs.seed("/other/x.j2", "").unwrap();

        let files = fs.list_files_recursive(Path::new("/t")).unwrap();
        assert_eq!(files, [PathBuf::from("/t/sub/a.j2"), PathBuf::from("/t/z.j2")]);
    }

    #[test]
    fn clones_share_storage() {
        let fs = MemoryFilesystem::new();
        let handle = fs.clone();
        fs.seed("/a.txt", "shared").unwrap();
        assert_eq!(handle.read_file(Path::new("/a.txt")).as_deref(), Some("shared"));
    }
}
