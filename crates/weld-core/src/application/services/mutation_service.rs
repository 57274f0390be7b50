//! Source Mutator - runs planned mutations against files on disk.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, info};

use crate::application::ApplicationError;
use crate::application::ports::Filesystem;
use crate::domain::{DomainError, PlannedMutation, mutation};
use crate::error::{WeldError, WeldResult};

/// What a single mutation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationOutcome {
    Applied,
    /// The marker was already present.
    AlreadyApplied,
}

pub struct SourceMutator {
    filesystem: Arc<dyn Filesystem>,
}

impl SourceMutator {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Read the target under `root`, check the marker, rewrite.
    ///
    /// A missing target file counts as a missing anchor. Domain failures are
    /// wrapped with the owning feature, the file and the mutation name.
    pub fn apply(&self, root: &Path, planned: &PlannedMutation) -> WeldResult<MutationOutcome> {
        let name = planned.name();
        let path = root.join(planned.target);

        let failed = |source: DomainError| -> WeldError {
            ApplicationError::MutationFailed {
                feature: planned.feature.to_string(),
                file: planned.target.to_string(),
                mutation: name.clone(),
                source,
            }
            .into()
        };

        if !self.filesystem.exists(&path) {
            return Err(failed(DomainError::AnchorNotFound {
                mutation: name.clone(),
                anchor: format!("the file {}", planned.target),
            }));
        }

        let source = self.filesystem.read_to_string(&path)?;
        match mutation::run(planned.mutation.as_ref(), &source).map_err(failed)? {
            Some(rewritten) => {
                self.filesystem.write_file(&path, rewritten.as_bytes())?;
                info!(mutation = %name, file = planned.target, "Applied");
                Ok(MutationOutcome::Applied)
            }
            None => {
                debug!(mutation = %name, file = planned.target, "Already applied, skipping");
                Ok(MutationOutcome::AlreadyApplied)
            }
        }
    }
}
