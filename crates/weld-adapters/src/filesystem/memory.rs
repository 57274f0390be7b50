//! In-memory filesystem adapter for testing.

use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use weld_core::application::ApplicationError;
use weld_core::application::ports::Filesystem;
use weld_core::domain::paths;
use weld_core::error::{WeldError, WeldResult};

/// In-memory filesystem for testing.
///
/// Clones share state, so a test can keep a handle after giving one to the
/// composer.
#[derive(Debug, Clone, Default)]
pub struct MemoryFilesystem {
    inner: Arc<RwLock<MemoryFilesystemInner>>,
}

#[derive(Debug, Default)]
struct MemoryFilesystemInner {
    files: BTreeMap<PathBuf, Vec<u8>>,
    directories: BTreeSet<PathBuf>,
}

impl MemoryFilesystem {
    /// Create a new empty memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a file's content (testing helper).
    pub fn read_file(&self, path: &Path) -> Option<String> {
        let inner = self.inner.read().ok()?;
        inner
            .files
            .get(path)
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    /// All files, sorted.
    pub fn files(&self) -> Vec<PathBuf> {
        self.inner
            .read()
            .map(|inner| inner.files.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn read(&self) -> WeldResult<RwLockReadGuard<'_, MemoryFilesystemInner>> {
        self.inner.read().map_err(|_| poisoned())
    }

    fn write(&self) -> WeldResult<RwLockWriteGuard<'_, MemoryFilesystemInner>> {
        self.inner.write().map_err(|_| poisoned())
    }
}

fn poisoned() -> WeldError {
    WeldError::Internal {
        message: "memory filesystem lock poisoned".into(),
    }
}

impl MemoryFilesystemInner {
    fn add_dirs(&mut self, path: &Path) {
        let mut current = PathBuf::new();
        for component in path.components() {
            current.push(component);
            self.directories.insert(current.clone());
        }
    }
}

impl Filesystem for MemoryFilesystem {
    fn exists(&self, path: &Path) -> bool {
        self.inner
            .read()
            .map(|inner| inner.files.contains_key(path) || inner.directories.contains(path))
            .unwrap_or(false)
    }

    fn create_dir_all(&self, path: &Path) -> WeldResult<()> {
        self.write()?.add_dirs(path);
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> WeldResult<String> {
        let inner = self.read()?;
        let bytes = inner
            .files
            .get(path)
            .ok_or_else(|| ApplicationError::filesystem(path, "No such file"))?;
        String::from_utf8(bytes.clone())
            .map_err(|e| ApplicationError::filesystem(path, e).into())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> WeldResult<()> {
        let mut inner = self.write()?;
        if let Some(parent) = path.parent() {
            inner.add_dirs(parent);
        }
        inner.files.insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn list_files(&self, root: &Path) -> WeldResult<Vec<PathBuf>> {
        let inner = self.read()?;
        Ok(inner
            .files
            .keys()
            .filter(|p| {
                p.strip_prefix(root)
                    .is_ok_and(|rel| !paths::in_hidden_dir(rel))
            })
            .cloned()
            .collect())
    }

    fn rename(&self, from: &Path, to: &Path) -> WeldResult<()> {
        let mut inner = self.write()?;
        if inner.files.contains_key(to) || inner.directories.contains(to) {
            return Err(ApplicationError::DestinationExists {
                path: to.to_path_buf(),
            }
            .into());
        }

        let moved: Vec<PathBuf> = inner
            .files
            .keys()
            .filter(|p| p.starts_with(from))
            .cloned()
            .collect();
        for old in moved {
            if let (Some(bytes), Ok(rest)) = (inner.files.remove(&old), old.strip_prefix(from)) {
                inner.files.insert(to.join(rest), bytes);
            }
        }

        let dirs: Vec<PathBuf> = inner
            .directories
            .iter()
            .filter(|d| d.starts_with(from))
            .cloned()
            .collect();
        for old in dirs {
            inner.directories.remove(&old);
            if let Ok(rest) = old.strip_prefix(from) {
                let moved = to.join(rest);
                inner.add_dirs(&moved);
            }
        }
        inner.add_dirs(to);
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> WeldResult<()> {
        let mut inner = self.write()?;
        inner.directories.retain(|d| !d.starts_with(path));
        inner.files.retain(|p, _| !p.starts_with(path));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rename_moves_subtree() {
        let fs = MemoryFilesystem::new();
        fs.write_file(Path::new("/w/.stage/app/main.py"), b"app").unwrap();

        fs.rename(Path::new("/w/.stage"), Path::new("/w/shop")).unwrap();

        assert!(!fs.exists(Path::new("/w/.stage")));
        assert!(fs.exists(Path::new("/w/shop/app")));
        assert_eq!(
            fs.read_file(Path::new("/w/shop/app/main.py")).as_deref(),
            Some("app")
        );
    }

    #[test]
    fn listing_skips_dot_directories() {
        let fs = MemoryFilesystem::new();
        fs.write_file(Path::new("/w/.stage/.venv/LICENSE.txt"), b"\xe9").unwrap();
        fs.write_file(Path::new("/w/.stage/.env"), b"").unwrap();
        fs.write_file(Path::new("/w/.stage/app/main.py"), b"").unwrap();

        assert_eq!(
            fs.list_files(Path::new("/w/.stage")).unwrap(),
            vec![PathBuf::from("/w/.stage/.env"), PathBuf::from("/w/.stage/app/main.py")]
        );
    }

    #[test]
    fn remove_clears_everything_below() {
        let fs = MemoryFilesystem::new();
        fs.write_file(Path::new("/w/p/a.py"), b"").unwrap();
        fs.write_file(Path::new("/w/keep.py"), b"").unwrap();

        fs.remove_dir_all(Path::new("/w/p")).unwrap();

        assert_eq!(fs.files(), vec![PathBuf::from("/w/keep.py")]);
    }
}
