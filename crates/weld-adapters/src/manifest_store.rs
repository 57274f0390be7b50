//! `weld.toml` persistence.

use std::fs;
use std::path::Path;

use tracing::debug;
use weld_core::application::ApplicationError;
use weld_core::application::ports::ManifestStore;
use weld_core::domain::{MANIFEST_FILE, ProjectManifest};
use weld_core::error::WeldResult;

/// Reads and writes the project manifest as TOML.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlManifestStore;

impl TomlManifestStore {
    pub fn new() -> Self {
        Self
    }
}

impl ManifestStore for TomlManifestStore {
    fn load(&self, project_root: &Path) -> WeldResult<ProjectManifest> {
        let path = project_root.join(MANIFEST_FILE);
        if !path.is_file() {
            return Err(ApplicationError::ManifestNotFound { path }.into());
        }

        let text = fs::read_to_string(&path)
            .map_err(|e| ApplicationError::filesystem(&path, e))?;
        toml::from_str(&text).map_err(|e| {
            ApplicationError::ManifestInvalid {
                path: path.clone(),
                reason: e.message().to_string(),
            }
            .into()
        })
    }

    fn save(&self, project_root: &Path, manifest: &ProjectManifest) -> WeldResult<()> {
        let path = project_root.join(MANIFEST_FILE);
        let text = toml::to_string_pretty(manifest).map_err(|e| ApplicationError::ManifestInvalid {
            path: path.clone(),
            reason: e.to_string(),
        })?;
        fs::write(&path, text).map_err(|e| ApplicationError::filesystem(&path, e))?;
        debug!(path = %path.display(), "Wrote manifest");
        Ok(())
    }
}
