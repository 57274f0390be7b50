//! Core domain layer for weld.
//!
//! Pure logic: the feature model, the fragment catalog, placeholder tokens,
//! environment records and the source mutations. Nothing here touches the
//! filesystem; the application layer reads and writes through ports.
//!
//! ## Hexagonal Architecture Compliance
//!
//! - **No async**: Domain logic is synchronous
//! - **No I/O**: Mutations take and return strings
//! - **Values**: Selections, plans and mutations are plain data
//! - **Rich domain model**: Behavior lives with the types, not the services

pub mod catalog;
pub mod env_record;
pub mod error;
pub mod fragment;
pub mod manifest;
pub mod mutation;
pub mod plan;
pub mod selection;
pub mod tokens;
pub mod value_objects;

mod validation;

pub use catalog::{BASE_FRAGMENT, paths};
pub use env_record::{EnvRecord, EnvVar};
pub use error::{DomainError, ErrorCategory};
pub use fragment::{Fragment, FragmentFile};
pub use manifest::{MANIFEST_FILE, ProjectManifest};
pub use mutation::{Mutation, MutationKind};
pub use plan::{CompositionPlan, FeatureStep, PlanMode, PlannedMutation};
pub use selection::{Feature, FeatureSelection};
pub use tokens::{BlockKind, ConfigBlock, TokenSet, is_text_file};
pub use validation::DomainValidator;
pub use value_objects::{
    Auth, Cache, Container, Database, FeatureSlot, Migrations, Observability, SlotVariant,
    Stack, TaskQueue,
};
