//! `weld add` adds one feature to a project that has a `weld.toml`.

use std::str::FromStr;

use tracing::{info, instrument};

use weld_core::application::ComposeOptions;
use weld_core::domain::FeatureSlot;
use weld_core::error::WeldError;

use crate::{
    cli::{AddArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

#[instrument(skip_all, fields(slot = %args.slot, path = %args.path.display()))]
pub fn execute(
    args: AddArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let slot = FeatureSlot::from_str(&args.slot).map_err(WeldError::from)?;

    let variant = match args.variant {
        Some(variant) => variant,
        None if !global.quiet && output.can_prompt() => super::choose_variant(slot)?,
        None => {
            return Err(CliError::invalid_input(format!(
                "no variant given for '{slot}' (one of: {})",
                slot.variants()[1..].join(", ")
            )));
        }
    };

    let skip_install = args.skip_install || config.defaults.skip_install;
    let options = ComposeOptions {
        install: !skip_install,
        format: config.installer.format_code && !skip_install,
    };

    let composer = super::composer(&config, &output);
    let report = composer.add_feature(&args.path, slot, &variant, options)?;
    info!(applied = report.applied.len(), skipped = report.skipped.len(), "Feature added");

    if output.format() == OutputFormat::Json {
        output.json(&super::new::report_json(&report))?;
        return Ok(());
    }

    let added = report
        .features
        .first()
        .map(ToString::to_string)
        .unwrap_or_else(|| format!("{slot}={variant}"));
    output.success(&format!("Added {added} to '{}'", report.manifest.project_name))?;
    output.field("Fragments", &report.fragments.join(", "))?;
    output.field(
        "Mutations",
        &format!("{} applied, {} already present", report.applied.len(), report.skipped.len()),
    )?;
    if !report.env_keys.is_empty() {
        output.field("Env keys", &report.env_keys.join(", "))?;
    }
    for warning in &report.warnings {
        output.warning(warning)?;
    }
    if !report.installed && !report.packages.is_empty() {
        output.info(&format!("Install with: uv add {}", report.packages.join(" ")))?;
    }
    Ok(())
}
