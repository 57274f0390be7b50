//! Fragment Service - copies fragment trees into a destination.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::application::ports::{Filesystem, FragmentStore};
use crate::domain::{Fragment, Stack};
use crate::error::WeldResult;

pub struct FragmentService {
    store: Arc<dyn FragmentStore>,
    filesystem: Arc<dyn Filesystem>,
}

impl FragmentService {
    pub fn new(store: Arc<dyn FragmentStore>, filesystem: Arc<dyn Filesystem>) -> Self {
        Self { store, filesystem }
    }

    pub fn resolve(&self, stack: Stack, id: &str) -> WeldResult<Fragment> {
        self.store.resolve(stack, id)
    }

    pub fn available(&self, stack: Stack) -> WeldResult<Vec<String>> {
        self.store.list(stack)
    }

    /// Resolve and copy a fragment under `destination`.
    pub fn install(
        &self,
        stack: Stack,
        id: &str,
        destination: &Path,
        overwrite: bool,
    ) -> WeldResult<usize> {
        let fragment = self.resolve(stack, id)?;
        self.materialize(&fragment, destination, overwrite)
    }

    /// Copy every file of `fragment` under `destination`, byte for byte.
    ///
    /// Without `overwrite`, every target is checked before anything is
    /// written and the first existing one fails the copy. With it, files
    /// are replaced and files outside the fragment are left alone.
    #[instrument(skip_all, fields(fragment = %fragment, overwrite))]
    pub fn materialize(
        &self,
        fragment: &Fragment,
        destination: &Path,
        overwrite: bool,
    ) -> WeldResult<usize> {
        if !overwrite {
            if let Some(file) = fragment
                .files
                .iter()
                .find(|f| self.filesystem.exists(&destination.join(&f.path)))
            {
                return Err(ApplicationError::FragmentConflict {
                    fragment: fragment.id.clone(),
                    path: destination.join(&file.path),
                }
                .into());
            }
        }

        for file in &fragment.files {
            let target = destination.join(&file.path);
            self.filesystem.write_file(&target, &file.contents)?;
            debug!(path = %file.path.display(), "Copied");
        }

        Ok(fragment.len())
    }
}
