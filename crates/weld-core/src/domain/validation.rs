use crate::domain::{error::DomainError, selection::FeatureSelection};

/// Centralized domain validation.
///
/// Everything the composer checks before touching the filesystem.
pub struct DomainValidator;

impl DomainValidator {
    /// A project name must be usable as a directory and a package name.
    pub fn validate_project_name(name: &str) -> Result<(), DomainError> {
        let invalid = |reason: &str| DomainError::InvalidProjectName {
            name: name.to_string(),
            reason: reason.to_string(),
        };

        if name.trim().is_empty() {
            return Err(invalid("name cannot be empty"));
        }
        if name.starts_with('.') {
            return Err(invalid("name cannot start with '.'"));
        }
        if name.contains(['/', '\\']) {
            return Err(invalid("name cannot contain path separators"));
        }
        if !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return Err(invalid("name must start with a letter"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ' ')))
        {
            return Err(invalid(&format!("character '{bad}' is not allowed")));
        }
        Ok(())
    }

    /// Enumerations are already typed; this checks cross-slot rules.
    pub fn validate_selection(selection: &FeatureSelection) -> Result<(), DomainError> {
        selection.validate()
    }
}
