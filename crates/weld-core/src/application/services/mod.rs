//! Application services - orchestrate use cases.
//!
//! `FeatureComposer` is the entry point; the smaller services each own one
//! pipeline stage and are reused by both fresh and incremental runs.

pub mod compose_service;
pub mod dependency_service;
pub mod env_service;
pub mod fragment_service;
pub mod mutation_service;
pub mod selection_service;
pub mod token_service;

pub use compose_service::{ComposeOptions, CompositionReport, FeatureComposer};
pub use dependency_service::CatalogDependencyResolver;
pub use env_service::EnvService;
pub use fragment_service::FragmentService;
pub use mutation_service::{MutationOutcome, SourceMutator};
pub use selection_service::SelectionService;
pub use token_service::{SubstitutionStats, TokenService};
