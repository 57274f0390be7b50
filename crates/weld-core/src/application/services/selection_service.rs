//! Selection Service - turns flags, defaults and prompts into a selection.

use tracing::debug;

use crate::application::ports::Prompter;
use crate::domain::{Database, FeatureSelection, FeatureSlot};
use crate::error::WeldResult;

/// Fills every slot, in priority order.
///
/// Precedence per slot: explicit value, then the prompt (when a prompter is
/// attached), then the configured default, then `none`.
pub struct SelectionService<'a> {
    prompter: Option<&'a dyn Prompter>,
}

impl<'a> SelectionService<'a> {
    pub fn non_interactive() -> Self {
        Self { prompter: None }
    }

    pub fn interactive(prompter: &'a dyn Prompter) -> Self {
        Self {
            prompter: Some(prompter),
        }
    }

    pub fn resolve(
        &self,
        explicit: &[(FeatureSlot, String)],
        defaults: &[(FeatureSlot, String)],
    ) -> WeldResult<FeatureSelection> {
        let lookup = |list: &[(FeatureSlot, String)], slot: FeatureSlot| {
            list.iter()
                .rev()
                .find(|(s, _)| *s == slot)
                .map(|(_, v)| v.clone())
        };

        let mut selection = FeatureSelection::new();
        for &slot in FeatureSlot::ALL {
            if let Some(value) = lookup(explicit, slot) {
                selection.set(slot, &value)?;
                continue;
            }

            let default = lookup(defaults, slot);
            let Some(prompter) = self.prompter.filter(|_| applies(slot, &selection)) else {
                if let Some(value) = default {
                    selection.set(slot, &value)?;
                }
                continue;
            };

            let variants = slot.variants();
            let choices: Vec<String> = slot.labels().iter().map(|l| l.to_string()).collect();
            let default_index = default
                .as_deref()
                .and_then(|d| {
                    let mut probe = FeatureSelection::new();
                    probe.set(slot, d).ok()?;
                    variants.iter().position(|v| *v == probe.get(slot))
                })
                .unwrap_or(0);

            let answer = prompter.choose(slot.prompt(), &choices, default_index)?;
            debug!(slot = %slot, answer = %answer, "Prompted");
            selection.set(slot, &answer)?;
        }

        Ok(selection)
    }
}

/// Whether asking about `slot` can lead anywhere, given earlier answers.
fn applies(slot: FeatureSlot, selection: &FeatureSelection) -> bool {
    match slot {
        FeatureSlot::Auth => selection.database != Database::None,
        FeatureSlot::Migrations => selection.database.is_relational(),
        _ => true,
    }
}
