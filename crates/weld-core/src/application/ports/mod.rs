//! Application ports (traits) for external dependencies.
//!
//! In hexagonal architecture, ports define interfaces that the application
//! needs from the outside world. Adapters in `weld-adapters` implement these.
//!
//! ## Port Types
//!
//! - **Driven (Output) Ports**: Called by application, implemented by infrastructure
//!   - `Filesystem`: File operations
//!   - `FragmentStore`: Fragment lookup
//!   - `ManifestStore`: `weld.toml` persistence
//!   - `DependencyResolver`, `PackageInstaller`, `CodeFormatter`: post-publish tooling
//!   - `Prompter`: interactive selection (implemented by the CLI)
//!
//! - **Driving (Input) Ports**: Called by external world, implemented by application
//!   - `FeatureComposer` (`compose`, `add_feature`, `plan`)

pub mod output;

pub use output::{
    CodeFormatter, DependencyResolver, Filesystem, FragmentStore, ManifestStore,
    PackageInstaller, Prompter,
};

#[cfg(test)]
pub use output::{
    MockCodeFormatter, MockDependencyResolver, MockFilesystem, MockFragmentStore,
    MockManifestStore, MockPackageInstaller, MockPrompter,
};
