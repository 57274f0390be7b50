//! Fragment library adapters.
//!
//! Fragments live at `<root>/<stack>/<fragment-id>/...`. The embedded
//! library ships with the binary; a directory on disk can replace it.

mod directory;
mod embedded;

use std::env;
use std::path::PathBuf;

use tracing::debug;
use weld_core::application::ports::FragmentStore;

pub use directory::DirectoryFragmentStore;
pub use embedded::EmbeddedFragmentStore;

/// Environment variable pointing at a local fragment library.
pub const FRAGMENTS_DIR_ENV: &str = "WELD_FRAGMENTS_DIR";

/// Pick the fragment library for this run.
///
/// `WELD_FRAGMENTS_DIR` wins over `configured`; without either the
/// embedded library is used.
pub fn default_store(configured: Option<PathBuf>) -> Box<dyn FragmentStore> {
    let from_env = env::var_os(FRAGMENTS_DIR_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from);

    match from_env.or(configured) {
        Some(root) => {
            debug!(root = %root.display(), "Using local fragment library");
            Box::new(DirectoryFragmentStore::new(root))
        }
        None => Box::new(EmbeddedFragmentStore::new()),
    }
}
