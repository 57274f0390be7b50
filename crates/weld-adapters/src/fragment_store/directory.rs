//! Fragment library read from a directory on disk.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, instrument};
use walkdir::WalkDir;
use weld_core::application::ApplicationError;
use weld_core::application::ports::FragmentStore;
use weld_core::domain::{Fragment, FragmentFile, Stack};
use weld_core::error::WeldResult;

/// Serves fragments from `<root>/<stack>/<id>/`.
#[derive(Debug, Clone)]
pub struct DirectoryFragmentStore {
    root: PathBuf,
}

impl DirectoryFragmentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl FragmentStore for DirectoryFragmentStore {
    #[instrument(skip(self), fields(root = %self.root.display()))]
    fn resolve(&self, stack: Stack, id: &str) -> WeldResult<Fragment> {
        let dir = self.root.join(stack.as_str()).join(id);
        if !dir.is_dir() {
            return Err(ApplicationError::FragmentNotFound {
                stack: stack.to_string(),
                fragment: id.to_string(),
            }
            .into());
        }

        let mut files = Vec::new();
        for entry in WalkDir::new(&dir) {
            let entry = entry.map_err(|e| {
                ApplicationError::filesystem(e.path().unwrap_or(dir.as_path()), e.to_string())
            })?;
            if !entry.file_type().is_file() {
                continue;
            }
            let contents = fs::read(entry.path())
                .map_err(|e| ApplicationError::filesystem(entry.path(), e))?;
            let relative = entry
                .path()
                .strip_prefix(&dir)
                .map(Path::to_path_buf)
                .unwrap_or_else(|_| entry.path().to_path_buf());
            files.push(FragmentFile::new(relative, contents));
        }

        debug!(files = files.len(), "Loaded fragment");
        Ok(Fragment::new(stack, id, files))
    }

    fn list(&self, stack: Stack) -> WeldResult<Vec<String>> {
        let dir = self.root.join(stack.as_str());
        let Ok(entries) = fs::read_dir(&dir) else {
            return Ok(Vec::new());
        };

        let mut ids: Vec<String> = entries
            .filter_map(Result::ok)
            .filter(|e| e.path().is_dir())
            .filter_map(|e| e.file_name().to_str().map(str::to_string))
            .collect();
        ids.sort();
        Ok(ids)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn library() -> TempDir {
        let dir = TempDir::new().unwrap();
        let redis = dir.path().join("fastapi/redis/app/core");
        fs::create_dir_all(&redis).unwrap();
        fs::write(redis.join("redis.py"), "client = None\n").unwrap();
        fs::create_dir_all(dir.path().join("fastapi/base")).unwrap();
        dir
    }

    #[test]
    fn resolves_nested_files() {
        let dir = library();
        let store = DirectoryFragmentStore::new(dir.path());

        let fragment = store.resolve(Stack::FastApi, "redis").unwrap();
        let file = fragment.file("app/core/redis.py").unwrap();
        assert_eq!(file.contents, b"client = None\n");
        assert_eq!(store.list(Stack::FastApi).unwrap(), vec!["base", "redis"]);
    }

    #[test]
    fn missing_fragment_is_not_found() {
        let dir = library();
        let err = DirectoryFragmentStore::new(dir.path())
            .resolve(Stack::FastApi, "sentry")
            .unwrap_err();
        assert!(matches!(
            err,
            weld_core::error::WeldError::Application(ApplicationError::FragmentNotFound { .. })
        ));
    }
}
