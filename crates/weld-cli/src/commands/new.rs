//! Implementation of the `weld new` command.
//!
//! Responsibility: turn flags, config defaults and prompts into a feature
//! selection, hand it to the composer, and display the report.  No
//! composition logic lives here.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::json;
use tracing::{debug, info, instrument};

use weld_core::application::{ComposeOptions, CompositionReport, FeatureComposer};
use weld_core::domain::{CompositionPlan, Stack};
use weld_core::error::WeldError;

use crate::{
    cli::{NewArgs, OutputFormat, global::GlobalArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute the `weld new` command.
///
/// 1. Resolve the destination and project name
/// 2. Resolve the stack and fill every slot
/// 3. `--dry-run`: print the plan and stop
/// 4. Compose, then print the report and next steps
#[instrument(skip_all, fields(project = %args.name))]
pub fn execute(
    args: NewArgs,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let (project_name, destination) = resolve_project_path(&args.name)?;

    let stack_name = args.stack.as_deref().unwrap_or(&config.defaults.stack);
    let stack = Stack::from_str(stack_name).map_err(WeldError::from)?;

    let interactive = !args.yes && !global.quiet && output.can_prompt();
    let selection = super::select_features(
        &args.features.explicit(),
        &config.defaults.slot_pairs(),
        interactive,
    )?;
    debug!(%stack, %selection, interactive, "Selection resolved");

    let composer = super::composer(&config, &output);

    if args.dry_run {
        let plan = composer.plan(stack, &project_name, selection)?;
        return show_plan(&composer, &plan, &destination, &output);
    }

    let skip_install = args.skip_install || config.defaults.skip_install;
    let options = ComposeOptions {
        install: !skip_install,
        format: config.installer.format_code && !skip_install,
    };

    output.header(&format!("Creating '{project_name}'..."))?;
    info!(project = %project_name, path = %destination.display(), "Compose started");

    let report = composer.compose(stack, selection, &destination, options)?;

    info!(project = %project_name, "Compose completed");
    show_report(&report, skip_install, &output)
}

// ── Path resolution ───────────────────────────────────────────────────────────

/// Split `name` into the project name (last component) and the destination.
pub fn resolve_project_path(name: &str) -> CliResult<(String, PathBuf)> {
    let path = Path::new(name);

    let project_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| {
            CliError::invalid_input(format!("cannot derive a project name from '{name}'"))
        })?
        .to_string();

    Ok((project_name, path.to_path_buf()))
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(
    composer: &FeatureComposer,
    plan: &CompositionPlan,
    destination: &Path,
    out: &OutputManager,
) -> CliResult<()> {
    let features: Vec<String> = plan.features().iter().map(ToString::to_string).collect();
    let mutations: Vec<String> = plan
        .mutations()
        .map(|m| format!("{} ({})", m.name(), m.target))
        .collect();
    let packages = composer.packages(plan);

    if out.format() == OutputFormat::Json {
        out.json(&json!({
            "dry_run": true,
            "destination": destination.display().to_string(),
            "stack": plan.stack.as_str(),
            "project_name": plan.project_name,
            "features": features,
            "fragments": plan.fragments(),
            "mutations": mutations,
            "env_keys": plan.env_keys(),
            "packages": packages,
        }))?;
        return Ok(());
    }

    out.info(&format!(
        "Dry run: would create '{}' at {}",
        plan.project_name,
        destination.display()
    ))?;
    if destination.exists() {
        out.warning("The destination already exists; composing would fail")?;
    }
    out.field("Stack", plan.stack.as_str())?;
    out.field("Features", &or_none(&features))?;
    out.field("Fragments", &plan.fragments().join(", "))?;
    out.field("Env keys", &or_none(&plan.env_keys()))?;
    out.field("Packages", &or_none(&packages))?;
    out.print("")?;
    out.header("Mutations")?;
    for mutation in &mutations {
        out.print(&format!("  {mutation}"))?;
    }
    Ok(())
}

fn show_report(report: &CompositionReport, skip_install: bool, out: &OutputManager) -> CliResult<()> {
    if out.format() == OutputFormat::Json {
        out.json(&report_json(report))?;
        return Ok(());
    }

    let name = &report.manifest.project_name;
    out.success(&format!("Project '{name}' created at {}", report.destination.display()))?;
    let features: Vec<String> = report.features.iter().map(ToString::to_string).collect();
    out.field("Features", &or_none(&features))?;
    out.field(
        "Mutations",
        &format!("{} applied, {} already present", report.applied.len(), report.skipped.len()),
    )?;

    for warning in &report.warnings {
        out.warning(warning)?;
    }

    out.print("")?;
    out.print("Next steps:")?;
    out.print(&format!("  cd {}", report.destination.display()))?;
    if skip_install || !report.installed {
        out.print(&format!("  uv add {}", report.packages.join(" ")))?;
    }
    out.print("  uv run fastapi dev")?;
    Ok(())
}

/// JSON shape shared by `new` and `add`.
pub(crate) fn report_json(report: &CompositionReport) -> serde_json::Value {
    let features: Vec<String> = report.features.iter().map(ToString::to_string).collect();
    json!({
        "destination": report.destination.display().to_string(),
        "project_name": report.manifest.project_name,
        "stack": report.manifest.stack.as_str(),
        "features": features,
        "fragments": report.fragments,
        "applied": report.applied,
        "skipped": report.skipped,
        "env_keys": report.env_keys,
        "packages": report.packages,
        "installed": report.installed,
        "warnings": report.warnings,
    })
}

fn or_none<S: AsRef<str>>(items: &[S]) -> String {
    if items.is_empty() {
        return "none".into();
    }
    items.iter().map(AsRef::as_ref).collect::<Vec<_>>().join(", ")
}

// ── Tests ─────────────────────────────────────────────────────────────────────
