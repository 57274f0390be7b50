//! Driven (output) ports - implemented by infrastructure.
//!
//! These traits define what the composer needs from the outside world.
//! The `weld-adapters` crate provides implementations; the CLI provides the
//! interactive prompter.

use std::path::{Path, PathBuf};

use crate::domain::{Feature, Fragment, ProjectManifest, Stack};
use crate::error::WeldResult;

#[cfg(test)]
use mockall::automock;

/// Port for filesystem operations.
///
/// Implemented by:
/// - `weld_adapters::filesystem::LocalFilesystem` (production)
/// - `weld_adapters::filesystem::MemoryFilesystem` (testing)
#[cfg_attr(test, automock)]
pub trait Filesystem: Send + Sync {
    /// Check if path exists (file or directory).
    fn exists(&self, path: &Path) -> bool;

    /// Create a directory and all parent directories.
    fn create_dir_all(&self, path: &Path) -> WeldResult<()>;

    fn read_to_string(&self, path: &Path) -> WeldResult<String>;

    /// Write a file, creating parent directories as needed.
    fn write_file(&self, path: &Path, content: &[u8]) -> WeldResult<()>;

    /// Every file below `root`, recursively, as full paths in sorted order.
    ///
    /// Directories whose name starts with a dot below `root` are skipped.
    fn list_files(&self, root: &Path) -> WeldResult<Vec<PathBuf>>;

    /// Move `from` onto `to`. `to` must not exist.
    fn rename(&self, from: &Path, to: &Path) -> WeldResult<()>;

    /// Remove a directory and all contents.
    fn remove_dir_all(&self, path: &Path) -> WeldResult<()>;
}

/// Port for the fragment library.
///
/// Implemented by:
/// - `weld_adapters::fragment_store::EmbeddedFragmentStore` (built into the binary)
/// - `weld_adapters::fragment_store::DirectoryFragmentStore` (local override)
#[cfg_attr(test, automock)]
pub trait FragmentStore: Send + Sync {
    /// Resolve a fragment; `FragmentNotFound` if the stack has no such id.
    fn resolve(&self, stack: Stack, id: &str) -> WeldResult<Fragment>;

    /// Fragment ids available for `stack`, sorted.
    fn list(&self, stack: Stack) -> WeldResult<Vec<String>>;
}

/// Port for reading and writing `weld.toml`.
#[cfg_attr(test, automock)]
pub trait ManifestStore: Send + Sync {
    /// `ManifestNotFound` if the project has none, `ManifestInvalid` if it
    /// cannot be parsed.
    fn load(&self, project_root: &Path) -> WeldResult<ProjectManifest>;

    fn save(&self, project_root: &Path, manifest: &ProjectManifest) -> WeldResult<()>;
}

/// Maps features to the packages they need.
///
/// Called once per feature; answers never depend on call order.
#[cfg_attr(test, automock)]
pub trait DependencyResolver: Send + Sync {
    /// Packages every project of `stack` needs.
    fn base_packages(&self, stack: Stack) -> Vec<String>;

    fn packages(&self, stack: Stack, feature: Feature) -> Vec<String>;
}

/// Installs packages into a generated project. Blocking, no timeout.
#[cfg_attr(test, automock)]
pub trait PackageInstaller: Send + Sync {
    fn install(&self, packages: &[String], destination: &Path) -> WeldResult<()>;
}

/// Formats a generated project. Failures are ignored by the composer.
#[cfg_attr(test, automock)]
pub trait CodeFormatter: Send + Sync {
    fn format(&self, destination: &Path) -> WeldResult<()>;
}

/// Asks the user to pick one of `choices`.
#[cfg_attr(test, automock)]
pub trait Prompter {
    /// Returns the chosen entry; `default` indexes into `choices`.
    fn choose(&self, prompt: &str, choices: &[String], default: usize) -> WeldResult<String>;
}
