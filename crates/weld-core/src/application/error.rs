//! Application layer errors.
//!
//! These errors represent failures in orchestration, not business logic.
//! Business logic errors are `DomainError` from `crate::domain`.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;
use crate::error::ErrorCategory;

/// Errors that occur during composition and feature addition.
#[derive(Debug, Error, Clone)]
pub enum ApplicationError {
    /// Fresh composition refuses to touch an existing path.
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("Fragment '{fragment}' not found for stack '{stack}'")]
    FragmentNotFound { stack: String, fragment: String },

    /// A non-overwriting copy would clobber an existing file.
    #[error("Fragment '{fragment}' conflicts with existing file {path}")]
    FragmentConflict { fragment: String, path: PathBuf },

    /// A mutation failed during a fresh composition.
    #[error("{feature}: mutation '{mutation}' failed on {file}: {source}")]
    MutationFailed {
        feature: String,
        file: String,
        mutation: String,
        #[source]
        source: DomainError,
    },

    /// An add-feature run stopped part way; the project is partially wired.
    #[error("{feature} was only partially added: mutation '{mutation}' failed on {file}: {reason}")]
    IncompleteFeature {
        feature: String,
        mutation: String,
        file: String,
        reason: String,
        applied: Vec<String>,
    },

    #[error("No weld manifest found at {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Manifest at {path} cannot be read: {reason}")]
    ManifestInvalid { path: PathBuf, reason: String },

    #[error("'{slot}' is already enabled ({current})")]
    FeatureAlreadyEnabled { slot: String, current: String },

    /// Filesystem operation failed.
    #[error("Filesystem error at {path}: {reason}")]
    FilesystemError { path: PathBuf, reason: String },

    /// An external program (installer, formatter) failed.
    #[error("'{program}' failed: {reason}")]
    ProcessFailed { program: String, reason: String },

    /// Interactive input could not be collected.
    #[error("Prompt failed: {reason}")]
    PromptFailed { reason: String },
}

impl ApplicationError {
    pub fn filesystem(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::FilesystemError {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Get user-actionable suggestions.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::DestinationExists { path } => vec![
                format!("Remove {} or choose a different project name", path.display()),
                "Use: weld add <slot> to extend an existing weld project".into(),
            ],
            Self::FragmentNotFound { .. } => vec![
                "Check WELD_FRAGMENTS_DIR or fragments.local_path in your config".into(),
                "Unset both to use the built-in fragment library".into(),
            ],
            Self::FragmentConflict { path, .. } => {
                vec![format!("Move {} out of the way and retry", path.display())]
            }
            Self::MutationFailed { source, .. } => source.suggestions(),
            Self::IncompleteFeature { applied, .. } => {
                let mut out = Vec::new();
                if applied.is_empty() {
                    out.push("No changes were applied before the failure".into());
                } else {
                    out.push(format!("Already applied: {}", applied.join(", ")));
                }
                out.push("Fix the file by hand or revert it, then run the command again".into());
                out.push("Mutations that already ran are skipped on the next run".into());
                out
            }
            Self::ManifestNotFound { .. } => vec![
                "Run this command from the root of a project created by weld".into(),
                "Or pass --path <project>".into(),
            ],
            Self::ManifestInvalid { .. } => {
                vec!["Check weld.toml for unknown slots or values".into()]
            }
            Self::FeatureAlreadyEnabled { slot, .. } => vec![
                format!("'{slot}' can only be set once per project"),
                "Changing a feature's variant is not supported".into(),
            ],
            Self::FilesystemError { path, .. } => vec![
                format!("Failed to access: {}", path.display()),
                "Check that you have write permissions".into(),
            ],
            Self::ProcessFailed { program, .. } => {
                vec![format!("Make sure '{program}' is installed and on PATH")]
            }
            Self::PromptFailed { .. } => {
                vec!["Pass every feature as a flag, or use --yes".into()]
            }
        }
    }

    /// Get error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DestinationExists { .. } | Self::FeatureAlreadyEnabled { .. } => {
                ErrorCategory::Validation
            }
            Self::FragmentNotFound { .. } | Self::ManifestNotFound { .. } => {
                ErrorCategory::NotFound
            }
            Self::FragmentConflict { .. }
            | Self::MutationFailed { .. }
            | Self::IncompleteFeature { .. } => ErrorCategory::Conflict,
            Self::ManifestInvalid { .. } => ErrorCategory::Configuration,
            Self::FilesystemError { .. } | Self::ProcessFailed { .. } | Self::PromptFailed { .. } => {
                ErrorCategory::Internal
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mutation_failure_names_feature_file_and_mutation() {
        let err = ApplicationError::MutationFailed {
            feature: "cache=redis".into(),
            file: "app/main.py".into(),
            mutation: "lifecycle-hook[cache]".into(),
            source: DomainError::AnchorNotFound {
                mutation: "lifecycle-hook[cache]".into(),
                anchor: "the lifespan function".into(),
            },
        };

        let msg = err.to_string();
        assert!(msg.contains("cache=redis"));
        assert!(msg.contains("app/main.py"));
        assert!(msg.contains("lifecycle-hook[cache]"));
        assert_eq!(err.category(), ErrorCategory::Conflict);
    }

    #[test]
    fn incomplete_feature_lists_applied_mutations() {
        let err = ApplicationError::IncompleteFeature {
            feature: "auth=bearer".into(),
            mutation: "model-registration[User]".into(),
            file: "app/core/db.py".into(),
            reason: "no registry call".into(),
            applied: vec!["router-include[auth_router]".into()],
        };

        assert!(
            err.suggestions()
                .iter()
                .any(|s| s.contains("router-include[auth_router]"))
        );
    }
}
