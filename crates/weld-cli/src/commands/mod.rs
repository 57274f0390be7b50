//! Command handlers.  Each module owns one subcommand.

pub mod add;
pub mod completions;
pub mod config;
pub mod features;
pub mod init;
pub mod new;

use std::sync::Arc;

use weld_adapters::{
    BlackFormatter, LocalFilesystem, TomlManifestStore, UvInstaller, default_store,
};
use weld_core::application::{
    CatalogDependencyResolver, CodeFormatter, FeatureComposer, PackageInstaller,
    SelectionService,
};
use weld_core::domain::{FeatureSelection, FeatureSlot};

use crate::{
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
    progress::Spinning,
};

/// Wire the composer to the local filesystem and the configured tools.
pub(crate) fn composer(config: &AppConfig, output: &OutputManager) -> FeatureComposer {
    let store = Arc::from(default_store(config.fragments.local_path.clone()));
    let spinner = output.shows_progress();

    let installer: Arc<dyn PackageInstaller> =
        Arc::new(UvInstaller::with_command(config.installer.command.clone()));
    let formatter: Arc<dyn CodeFormatter> = Arc::new(BlackFormatter);

    FeatureComposer::new(
        Arc::new(LocalFilesystem::new()),
        store,
        Arc::new(TomlManifestStore::new()),
        Arc::new(CatalogDependencyResolver),
    )
    .with_installer(Arc::new(Spinning::new(installer, spinner)))
    .with_formatter(Arc::new(Spinning::new(formatter, spinner)))
}

/// Fill every slot from flags, prompts and configured defaults.
#[cfg(feature = "interactive")]
pub(crate) fn select_features(
    explicit: &[(FeatureSlot, String)],
    defaults: &[(FeatureSlot, String)],
    interactive: bool,
) -> CliResult<FeatureSelection> {
    if !interactive {
        return Ok(SelectionService::non_interactive().resolve(explicit, defaults)?);
    }
    let prompter = crate::prompt::DialoguerPrompter::new();
    SelectionService::interactive(&prompter)
        .resolve(explicit, defaults)
        .map_err(|e| {
            if prompter.was_cancelled() {
                CliError::Cancelled
            } else {
                e.into()
            }
        })
}

#[cfg(not(feature = "interactive"))]
pub(crate) fn select_features(
    explicit: &[(FeatureSlot, String)],
    defaults: &[(FeatureSlot, String)],
    _interactive: bool,
) -> CliResult<FeatureSelection> {
    Ok(SelectionService::non_interactive().resolve(explicit, defaults)?)
}

/// Ask which variant of `slot` to add.  `none` is not offered.
#[cfg(feature = "interactive")]
pub(crate) fn choose_variant(slot: FeatureSlot) -> CliResult<String> {
    use weld_core::application::Prompter as _;

    let choices: Vec<String> = slot
        .labels()
        .into_iter()
        .skip(1)
        .map(str::to_string)
        .collect();
    let prompter = crate::prompt::DialoguerPrompter::new();
    prompter.choose(slot.prompt(), &choices, 0).map_err(|e| {
        if prompter.was_cancelled() {
            CliError::Cancelled
        } else {
            e.into()
        }
    })
}

#[cfg(not(feature = "interactive"))]
pub(crate) fn choose_variant(_slot: FeatureSlot) -> CliResult<String> {
    Err(CliError::FeatureNotAvailable {
        feature: "interactive",
    })
}
