//! Application layer for weld.
//!
//! This layer contains:
//! - **Services**: Use case orchestration (FeatureComposer and its stages)
//! - **Ports**: Interface definitions (traits) for external dependencies
//! - **Errors**: Application-specific error types
//!
//! The application layer coordinates the domain layer but contains no
//! business logic itself. All business rules live in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

#[cfg(test)]
pub(crate) mod testing;

pub use services::{
    CatalogDependencyResolver, ComposeOptions, CompositionReport, FeatureComposer,
    SelectionService, SubstitutionStats,
};

pub use ports::{
    CodeFormatter, DependencyResolver, Filesystem, FragmentStore, ManifestStore,
    PackageInstaller, Prompter,
};

pub use error::ApplicationError;
