//! Source mutations: idempotent, marker-guarded rewrites of generated files.
//!
//! Each mutation is a value that knows its target construct, its insertion
//! point and the marker proving it already ran. The composer builds a list
//! of them per feature; the mutator reads the file, checks the marker and
//! only then applies the rewrite.
//!
//! ```text
//! source ──► is_applied? ──yes──► no-op
//!                │
//!                no
//!                ▼
//!             apply ──► rewritten source | AnchorNotFound | MalformedExistingContent
//! ```

pub mod compose;
pub mod entrypoint;
pub mod registry;
pub mod router;
pub mod scanner;
pub mod settings;

use std::fmt;

use crate::domain::error::DomainError;

pub use compose::{ComposeDatabase, ComposeDependency, ComposeService};
pub use entrypoint::{HealthCheck, HealthEndpoint, LifecycleHook, LifespanWrapper, ObservabilityInit};
pub use registry::{ModelRegistration, Registry};
pub use router::RouterInclude;
pub use settings::SettingsSection;

/// How a mutation treats a missing construct.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Introduces the construct if it is missing.
    Structural,
    /// Extends an existing construct; a missing one is an error.
    Additive,
}

pub trait Mutation: fmt::Debug + Send + Sync {
    /// Stable, human-readable name, e.g. `lifecycle-hook[cache]`.
    fn name(&self) -> String;

    fn kind(&self) -> MutationKind {
        MutationKind::Additive
    }

    /// Text whose presence proves the mutation already ran.
    fn marker(&self) -> String;

    fn is_applied(&self, source: &str) -> bool {
        source.contains(&self.marker())
    }

    /// Rewrite `source`. Only called when the marker is absent.
    fn apply(&self, source: &str) -> Result<String, DomainError>;
}

/// Run `mutation` against `source`.
///
/// Returns `None` when the marker shows it already ran.
pub fn run(mutation: &dyn Mutation, source: &str) -> Result<Option<String>, DomainError> {
    if mutation.is_applied(source) {
        return Ok(None);
    }
    mutation.apply(source).map(Some)
}

pub(crate) fn anchor_not_found(mutation: &dyn Mutation, anchor: &str) -> DomainError {
    DomainError::AnchorNotFound {
        mutation: mutation.name(),
        anchor: anchor.to_string(),
    }
}

pub(crate) fn malformed(mutation: &dyn Mutation, reason: impl Into<String>) -> DomainError {
    DomainError::MalformedExistingContent {
        mutation: mutation.name(),
        reason: reason.into(),
    }
}
