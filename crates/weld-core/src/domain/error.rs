// ============================================================================
// domain/error.rs - FEATURE MODEL AND MUTATION ERRORS
// ============================================================================

use thiserror::Error;

/// Root domain error type.
///
/// All errors are:
/// - Cloneable (carried inside application errors and reports)
/// - Categorizable (for CLI display)
/// - Actionable (provides suggestions)
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    // ========================================================================
    // Validation Errors
    // ========================================================================
    #[error("invalid value '{value}' for feature slot '{slot}'")]
    InvalidFeature {
        slot: String,
        value: String,
        allowed: Vec<&'static str>,
    },

    #[error("unknown feature slot '{slot}'")]
    UnknownSlot { slot: String },

    #[error("unknown stack '{stack}'")]
    UnknownStack { stack: String },

    #[error("invalid project name '{name}': {reason}")]
    InvalidProjectName { name: String, reason: String },

    // ========================================================================
    // Compatibility Errors
    // ========================================================================
    #[error("'{feature}' cannot be enabled: {reason}")]
    UnsupportedCombination { feature: String, reason: String },

    #[error("config block '{block}' references token '{token}' that no feature provides")]
    UnresolvedToken { block: String, token: String },

    // ========================================================================
    // Source Mutation Errors
    // ========================================================================
    #[error("mutation '{mutation}' could not locate {anchor}")]
    AnchorNotFound { mutation: String, anchor: String },

    #[error("mutation '{mutation}' found malformed content: {reason}")]
    MalformedExistingContent { mutation: String, reason: String },
}

impl DomainError {
    /// Get user-actionable suggestions for fixing this error.
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFeature { slot, allowed, .. } => vec![
                format!("Valid values for '{slot}': {}", allowed.join(", ")),
                "Run: weld features to see every slot and variant".into(),
            ],
            Self::UnknownSlot { .. } => vec![
                "Feature slots: database, auth, container, migrations, cache, task-queue, observability".into(),
            ],
            Self::UnknownStack { .. } => vec!["Supported stacks: fastapi".into()],
            Self::InvalidProjectName { .. } => vec![
                "Use letters, digits, hyphens and underscores".into(),
                "Examples: my-api, shop_service, backend2".into(),
            ],
            Self::UnsupportedCombination { reason, .. } => vec![
                format!("Requirement: {reason}"),
                "Enable the required feature first, or pick a compatible variant".into(),
            ],
            Self::UnresolvedToken { token, .. } => vec![
                format!("No enabled feature contributes '__{token}__'"),
                "This is a bug in the fragment catalog, please report it".into(),
            ],
            Self::AnchorNotFound { anchor, .. } => vec![
                format!("Expected to find {anchor}"),
                "The file may have been edited by hand; restore the generated construct and retry"
                    .into(),
            ],
            Self::MalformedExistingContent { .. } => vec![
                "The file is partially wired; finish or revert the change manually".into(),
            ],
        }
    }

    /// Error category for CLI display styling.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidFeature { .. }
            | Self::UnknownSlot { .. }
            | Self::UnknownStack { .. }
            | Self::InvalidProjectName { .. } => ErrorCategory::Validation,
            Self::UnsupportedCombination { .. } => ErrorCategory::Compatibility,
            Self::AnchorNotFound { .. } | Self::MalformedExistingContent { .. } => {
                ErrorCategory::Conflict
            }
            Self::UnresolvedToken { .. } => ErrorCategory::Internal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Compatibility,
    Conflict,
    Internal,
}
