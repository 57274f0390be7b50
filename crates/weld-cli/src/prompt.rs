//! Terminal prompts backed by dialoguer.

use std::cell::Cell;

use dialoguer::{Select, theme::ColorfulTheme};
use weld_core::application::{ApplicationError, Prompter};
use weld_core::error::{WeldError, WeldResult};

/// Single-choice prompts on the terminal.
///
/// Escape or `q` cancels; the prompt then fails and
/// [`DialoguerPrompter::was_cancelled`] reports it.
pub struct DialoguerPrompter {
    theme: ColorfulTheme,
    cancelled: Cell<bool>,
}

impl DialoguerPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            cancelled: Cell::new(false),
        }
    }

    pub fn was_cancelled(&self) -> bool {
        self.cancelled.get()
    }
}

impl Default for DialoguerPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for DialoguerPrompter {
    fn choose(&self, prompt: &str, choices: &[String], default: usize) -> WeldResult<String> {
        let picked = Select::with_theme(&self.theme)
            .with_prompt(prompt)
            .items(choices)
            .default(default.min(choices.len().saturating_sub(1)))
            .interact_opt()
            .map_err(|e| ApplicationError::PromptFailed {
                reason: e.to_string(),
            })?;

        let Some(index) = picked else {
            self.cancelled.set(true);
            return Err(ApplicationError::PromptFailed {
                reason: "cancelled".into(),
            }
            .into());
        };

        choices.get(index).cloned().ok_or_else(|| WeldError::Internal {
            message: format!("prompt returned index {index} of {}", choices.len()),
        })
    }
}
