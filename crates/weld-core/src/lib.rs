//! weld core - Hexagonal Architecture Implementation
//!
//! This crate provides the domain and application layers for the weld
//! feature composer, following hexagonal (ports and adapters) architecture.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │             weld-cli (CLI)              │
//! │     (flags, prompts, config, output)    │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (FeatureComposer, SelectionService)    │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │        Application Ports (Traits)       │
//! │ (Filesystem, FragmentStore, Installer)  │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │      weld-adapters (Infrastructure)     │
//! │ (LocalFilesystem, EmbeddedFragmentStore)│
//! └─────────────────────────────────────────┘
//!
//!          Domain Layer (Pure Logic)
//!  selection · catalog · plan · tokens · mutations
//! ```
//!
//! ## Usage
//!
//! ```rust,no_run
//! use weld_core::prelude::*;
//!
//! # fn run(composer: FeatureComposer) -> WeldResult<()> {
//! let selection = FeatureSelection::from_pairs([("database", "sqlite"), ("cache", "redis")])?;
//! let report = composer.compose(
//!     Stack::FastApi,
//!     selection,
//!     std::path::Path::new("./shop"),
//!     ComposeOptions::default(),
//! )?;
//! println!("applied {} mutations", report.applied.len());
//! # Ok(())
//! # }
//! ```

pub mod domain;

pub mod application;

pub mod error;

// Public API - what external crates should use
pub mod prelude {
    pub use crate::application::{
        ComposeOptions, CompositionReport, FeatureComposer, SelectionService,
        ports::{
            CodeFormatter, DependencyResolver, Filesystem, FragmentStore, ManifestStore,
            PackageInstaller, Prompter,
        },
    };
    pub use crate::domain::{
        CompositionPlan, Feature, FeatureSelection, FeatureSlot, ProjectManifest, Stack,
    };
    pub use crate::error::{WeldError, WeldResult};
}

// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
