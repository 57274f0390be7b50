//! Settings schema mutation (`app/core/config.py`), used when a feature is
//! added to an existing project.

use crate::domain::error::DomainError;
use crate::domain::mutation::scanner::{lines_in, splice};
use crate::domain::mutation::{Mutation, anchor_not_found};
use crate::domain::tokens::BlockKind;

/// Replace a section's `none` line with its rendered block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsSection {
    pub kind: BlockKind,
    /// Rendered block, already resolved against the project's tokens.
    pub text: String,
}

impl SettingsSection {
    pub fn new(kind: BlockKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

impl Mutation for SettingsSection {
    fn name(&self) -> String {
        format!("settings-section[{}]", self.kind.as_str())
    }

    fn marker(&self) -> String {
        self.kind.header()
    }

    fn is_applied(&self, source: &str) -> bool {
        let header = self.kind.header();
        source.lines().any(|l| l.trim_end() == header)
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let placeholder = self.kind.placeholder();
        let (at, line) = lines_in(source, 0, source.len())
            .into_iter()
            .find(|(_, l)| l.trim_end() == placeholder)
            .ok_or_else(|| anchor_not_found(self, &format!("the `{}` line", placeholder.trim())))?;

        let end = at + line.trim_end_matches(['\n', '\r']).len();
        Ok(splice(source, at, end, self.text.trim_end_matches('\n')))
    }
}
