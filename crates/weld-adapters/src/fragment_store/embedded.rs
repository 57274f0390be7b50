//! Fragment library compiled into the binary.

use std::path::PathBuf;

use include_dir::{Dir, include_dir};
use weld_core::application::ApplicationError;
use weld_core::application::ports::FragmentStore;
use weld_core::domain::{Fragment, FragmentFile, Stack};
use weld_core::error::WeldResult;

static FRAGMENTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/fragments");

/// Serves the built-in fragments.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedFragmentStore;

impl EmbeddedFragmentStore {
    pub fn new() -> Self {
        Self
    }
}

impl FragmentStore for EmbeddedFragmentStore {
    fn resolve(&self, stack: Stack, id: &str) -> WeldResult<Fragment> {
        let dir = FRAGMENTS
            .get_dir(format!("{}/{}", stack.as_str(), id))
            .ok_or_else(|| ApplicationError::FragmentNotFound {
                stack: stack.to_string(),
                fragment: id.to_string(),
            })?;

        let mut files = Vec::new();
        collect(dir, dir.path(), &mut files);
        Ok(Fragment::new(stack, id, files))
    }

    fn list(&self, stack: Stack) -> WeldResult<Vec<String>> {
        let mut ids: Vec<String> = FRAGMENTS
            .get_dir(stack.as_str())
            .map(|dir| {
                dir.dirs()
                    .filter_map(|d| d.path().file_name())
                    .map(|n| n.to_string_lossy().into_owned())
                    .collect()
            })
            .unwrap_or_default();
        ids.sort();
        Ok(ids)
    }
}

/// Gather every file below `dir`, with paths relative to `root`.
fn collect(dir: &Dir<'_>, root: &std::path::Path, out: &mut Vec<FragmentFile>) {
    for file in dir.files() {
        let relative = file
            .path()
            .strip_prefix(root)
            .map(PathBuf::from)
            .unwrap_or_else(|_| file.path().to_path_buf());
        out.push(FragmentFile::new(relative, file.contents()));
    }
    for sub in dir.dirs() {
        collect(sub, root, out);
    }
}
