//! In-memory port implementations for service tests.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, FragmentStore, ManifestStore};
use crate::domain::{Fragment, FragmentFile, ProjectManifest, Stack, paths};
use crate::error::WeldResult;

#[derive(Default)]
pub struct MemoryFs {
    files: Mutex<BTreeMap<PathBuf, Vec<u8>>>,
    dirs: Mutex<BTreeSet<PathBuf>>,
}

impl MemoryFs {
    pub fn put(&self, path: impl AsRef<Path>, content: &str) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.as_bytes().to_vec());
    }

    pub fn put_bytes(&self, path: impl AsRef<Path>, content: &[u8]) {
        self.files
            .lock()
            .unwrap()
            .insert(path.as_ref().to_path_buf(), content.to_vec());
    }

    pub fn read(&self, path: impl AsRef<Path>) -> Option<String> {
        self.files
            .lock()
            .unwrap()
            .get(path.as_ref())
            .map(|b| String::from_utf8_lossy(b).into_owned())
    }

    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.lock().unwrap().keys().cloned().collect()
    }
}

impl Filesystem for MemoryFs {
    fn exists(&self, path: &Path) -> bool {
        self.files
            .lock()
            .unwrap()
            .keys()
            .any(|p| p.starts_with(path))
            || self.dirs.lock().unwrap().iter().any(|d| d.starts_with(path))
    }

    fn create_dir_all(&self, path: &Path) -> WeldResult<()> {
        self.dirs.lock().unwrap().insert(path.to_path_buf());
        Ok(())
    }

    fn read_to_string(&self, path: &Path) -> WeldResult<String> {
        let bytes = self
            .files
            .lock()
            .unwrap()
            .get(path)
            .cloned()
            .ok_or_else(|| ApplicationError::filesystem(path, "not found"))?;
        String::from_utf8(bytes).map_err(|e| ApplicationError::filesystem(path, e).into())
    }

    fn write_file(&self, path: &Path, content: &[u8]) -> WeldResult<()> {
        self.files
            .lock()
            .unwrap()
            .insert(path.to_path_buf(), content.to_vec());
        Ok(())
    }

    fn list_files(&self, root: &Path) -> WeldResult<Vec<PathBuf>> {
        Ok(self
            .files
            .lock()
            .unwrap()
            .keys()
            .filter(|p| {
                p.strip_prefix(root)
                    .is_ok_and(|rel| !paths::in_hidden_dir(rel))
            })
            .cloned()
            .collect())
    }

    fn rename(&self, from: &Path, to: &Path) -> WeldResult<()> {
        if self.exists(to) {
            return Err(ApplicationError::filesystem(to, "already exists").into());
        }
        let mut files = self.files.lock().unwrap();
        let moved: Vec<PathBuf> = files.keys().filter(|p| p.starts_with(from)).cloned().collect();
        for old in moved {
            if let (Some(bytes), Ok(rest)) = (files.remove(&old), old.strip_prefix(from)) {
                files.insert(to.join(rest), bytes);
            }
        }
        let mut dirs = self.dirs.lock().unwrap();
        dirs.retain(|d| !d.starts_with(from));
        dirs.insert(to.to_path_buf());
        Ok(())
    }

    fn remove_dir_all(&self, path: &Path) -> WeldResult<()> {
        self.files.lock().unwrap().retain(|p, _| !p.starts_with(path));
        self.dirs.lock().unwrap().retain(|d| !d.starts_with(path));
        Ok(())
    }
}

/// Fragment store over a fixed map, for every stack.
#[derive(Default)]
pub struct StaticStore {
    fragments: BTreeMap<String, Vec<FragmentFile>>,
}

impl StaticStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, id: &str, files: Vec<FragmentFile>) -> Self {
        self.fragments.insert(id.to_string(), files);
        self
    }
}

impl FragmentStore for StaticStore {
    fn resolve(&self, stack: Stack, id: &str) -> WeldResult<Fragment> {
        self.fragments
            .get(id)
            .map(|files| Fragment::new(stack, id, files.clone()))
            .ok_or_else(|| {
                ApplicationError::FragmentNotFound {
                    stack: stack.to_string(),
                    fragment: id.to_string(),
                }
                .into()
            })
    }

    fn list(&self, _stack: Stack) -> WeldResult<Vec<String>> {
        Ok(self.fragments.keys().cloned().collect())
    }
}

#[derive(Default)]
pub struct MemoryManifests {
    manifests: Mutex<BTreeMap<PathBuf, ProjectManifest>>,
}

impl MemoryManifests {
    pub fn get(&self, root: impl AsRef<Path>) -> Option<ProjectManifest> {
        self.manifests.lock().unwrap().get(root.as_ref()).cloned()
    }
}

impl ManifestStore for MemoryManifests {
    fn load(&self, project_root: &Path) -> WeldResult<ProjectManifest> {
        self.get(project_root).ok_or_else(|| {
            ApplicationError::ManifestNotFound {
                path: project_root.to_path_buf(),
            }
            .into()
        })
    }

    fn save(&self, project_root: &Path, manifest: &ProjectManifest) -> WeldResult<()> {
        self.manifests
            .lock()
            .unwrap()
            .insert(project_root.to_path_buf(), manifest.clone());
        Ok(())
    }
}
