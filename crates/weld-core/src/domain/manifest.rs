//! Project manifest: the persisted record of what a project was composed
//! from. Written at publish time, amended by `add` operations.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::selection::FeatureSelection;
use crate::domain::value_objects::{FeatureSlot, Stack};

/// File name of the manifest, relative to the project root.
pub const MANIFEST_FILE: &str = "weld.toml";

/// Stored project identity and feature selection.
///
/// Only enabled slots are stored; reading an absent slot yields `"none"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub stack: Stack,
    pub project_name: String,
    #[serde(default)]
    pub weld_version: String,
    #[serde(default)]
    pub features: BTreeMap<String, String>,
}

impl ProjectManifest {
    /// Record a successful composition.
    pub fn new(stack: Stack, project_name: impl Into<String>, selection: &FeatureSelection) -> Self {
        let features = selection
            .pairs()
            .into_iter()
            .map(|(slot, variant)| (slot.as_str().to_string(), variant.to_string()))
            .collect();

        Self {
            stack,
            project_name: project_name.into(),
            weld_version: crate::VERSION.to_string(),
            features,
        }
    }

    /// Stored variant for `slot`, or the `none` sentinel.
    pub fn variant(&self, slot: FeatureSlot) -> &str {
        self.features
            .get(slot.as_str())
            .map(String::as_str)
            .unwrap_or("none")
    }

    /// Rebuild the typed selection. Fails if the file was edited to hold an
    /// unknown slot or value.
    pub fn selection(&self) -> Result<FeatureSelection, DomainError> {
        FeatureSelection::from_pairs(self.features.iter())
    }
}
