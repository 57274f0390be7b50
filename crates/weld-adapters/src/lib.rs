//! Infrastructure adapters for weld.
//!
//! This crate implements the driven ports defined in
//! `weld_core::application::ports`: the filesystem, the fragment library,
//! the `weld.toml` manifest and the external Python tooling.

pub mod filesystem;
pub mod fragment_store;
pub mod manifest_store;
pub mod process;

// Re-export commonly used adapters
pub use filesystem::{LocalFilesystem, MemoryFilesystem};
pub use fragment_store::{
    DirectoryFragmentStore, EmbeddedFragmentStore, FRAGMENTS_DIR_ENV, default_store,
};
pub use manifest_store::TomlManifestStore;
pub use process::{BlackFormatter, UvInstaller};
