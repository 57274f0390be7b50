//! Composition plan: the auditable list of everything a run will do.
//!
//! The plan is computed up front from the selection, before any file is
//! copied. Building it validates the project name, the cross-slot rules
//! and every config block's token requirements, so a plan that exists can
//! only fail on the filesystem.

use crate::domain::catalog::{self, BASE_FRAGMENT, paths};
use crate::domain::env_record::EnvVar;
use crate::domain::error::DomainError;
use crate::domain::mutation::{Mutation, SettingsSection};
use crate::domain::selection::{Feature, FeatureSelection};
use crate::domain::tokens::{ConfigBlock, TokenSet};
use crate::domain::validation::DomainValidator;
use crate::domain::value_objects::{FeatureSlot, Stack};

/// A mutation bound to the feature that owns it and the file it edits.
#[derive(Debug)]
pub struct PlannedMutation {
    pub feature: Feature,
    /// Path relative to the project root.
    pub target: &'static str,
    pub mutation: Box<dyn Mutation>,
}

impl PlannedMutation {
    pub fn new(feature: Feature, target: &'static str, mutation: Box<dyn Mutation>) -> Self {
        Self {
            feature,
            target,
            mutation,
        }
    }

    pub fn name(&self) -> String {
        self.mutation.name()
    }
}

/// Whether the plan builds a new project or extends an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanMode {
    Fresh,
    /// Add one feature to a published project, in place.
    Incremental(Feature),
}

/// One feature's share of the plan, run in this field order.
#[derive(Debug)]
pub struct FeatureStep {
    pub feature: Feature,
    pub fragments: Vec<&'static str>,
    pub structural: Vec<PlannedMutation>,
    pub additive: Vec<PlannedMutation>,
    pub env: Vec<EnvVar>,
}

impl FeatureStep {
    /// Structural mutations first, then additive ones.
    pub fn mutations(&self) -> impl Iterator<Item = &PlannedMutation> {
        self.structural.iter().chain(&self.additive)
    }
}

#[derive(Debug)]
pub struct CompositionPlan {
    pub stack: Stack,
    pub project_name: String,
    pub selection: FeatureSelection,
    pub mode: PlanMode,
    pub tokens: TokenSet,
    /// Present only in fresh mode.
    pub base_fragment: Option<&'static str>,
    /// Steps in priority order.
    pub steps: Vec<FeatureStep>,
    pub finishing: Vec<PlannedMutation>,
}

impl CompositionPlan {
    /// Plan a brand new project.
    pub fn fresh(
        stack: Stack,
        project_name: &str,
        selection: FeatureSelection,
    ) -> Result<Self, DomainError> {
        DomainValidator::validate_project_name(project_name)?;
        DomainValidator::validate_selection(&selection)?;
        Self::build(stack, project_name, selection, PlanMode::Fresh)
    }

    /// Plan adding `added` to a project whose full selection (including
    /// `added`) is `selection`.
    pub fn incremental(
        stack: Stack,
        project_name: &str,
        selection: FeatureSelection,
        added: Feature,
    ) -> Result<Self, DomainError> {
        DomainValidator::validate_selection(&selection)?;
        Self::build(stack, project_name, selection, PlanMode::Incremental(added))
    }

    fn build(
        stack: Stack,
        project_name: &str,
        selection: FeatureSelection,
        mode: PlanMode,
    ) -> Result<Self, DomainError> {
        let mut tokens = TokenSet::for_project(project_name);
        let mut steps = Vec::new();

        for &slot in FeatureSlot::ALL {
            let feature = selection.feature(slot);
            let recipe = feature.map(|f| catalog::recipe(stack, f, &selection));

            if let Some(recipe) = &recipe {
                for &(name, value) in &recipe.tokens {
                    tokens.insert(name, value);
                }
            }

            let mut section = None;
            if let Some(kind) = catalog::block_kind(slot) {
                let block = recipe
                    .as_ref()
                    .and_then(|r| r.block.clone())
                    .unwrap_or_else(|| ConfigBlock::disabled(kind));
                tokens.add_block(&block)?;
                section = tokens
                    .get(kind.token())
                    .map(|text| SettingsSection::new(kind, text));
            }

            let (Some(feature), Some(recipe)) = (feature, recipe) else {
                continue;
            };
            let added = match mode {
                PlanMode::Fresh => true,
                PlanMode::Incremental(added) => added == feature,
            };
            if !added {
                continue;
            }

            let mut additive = recipe.additive;
            if let (PlanMode::Incremental(_), Some(section)) = (mode, section) {
                additive.push(PlannedMutation::new(
                    feature,
                    paths::SETTINGS,
                    Box::new(section),
                ));
            }

            steps.push(FeatureStep {
                feature,
                fragments: recipe.fragments,
                structural: recipe.structural,
                additive,
                env: recipe.env,
            });
        }

        Ok(Self {
            stack,
            project_name: project_name.to_string(),
            selection,
            mode,
            tokens,
            base_fragment: matches!(mode, PlanMode::Fresh).then_some(BASE_FRAGMENT),
            steps,
            finishing: catalog::finishing(stack, &selection),
        })
    }

    /// Every mutation, in execution order.
    pub fn mutations(&self) -> impl Iterator<Item = &PlannedMutation> {
        self.steps
            .iter()
            .flat_map(FeatureStep::mutations)
            .chain(&self.finishing)
    }

    /// Every fragment, in copy order.
    pub fn fragments(&self) -> Vec<&'static str> {
        self.base_fragment
            .into_iter()
            .chain(self.steps.iter().flat_map(|s| s.fragments.iter().copied()))
            .collect()
    }

    /// Enabled features whose step runs in this plan.
    pub fn features(&self) -> Vec<Feature> {
        self.steps.iter().map(|s| s.feature).collect()
    }

    /// Whether this run creates the project (and so installs base packages).
    pub fn is_fresh(&self) -> bool {
        self.mode == PlanMode::Fresh
    }

    /// Environment keys the plan sets, in merge order.
    pub fn env_keys(&self) -> Vec<&str> {
        self.steps
            .iter()
            .flat_map(|s| s.env.iter().map(|v| v.key.as_str()))
            .collect()
    }
}
