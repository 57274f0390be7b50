//! `weld config` reads and writes configuration values.
//!
//! `get` and `list` show the effective configuration (file, environment and
//! defaults merged).  `set` edits the file only.

use std::path::Path;

use toml::{Table, Value};

use crate::{
    cli::{ConfigCommands, GlobalArgs, OutputFormat},
    config::AppConfig,
    error::{CliError, CliResult, IntoCli},
    output::OutputManager,
};

/// Dispatch to the correct config subcommand.
pub fn execute(
    cmd: ConfigCommands,
    global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let path = AppConfig::resolve_path(global.config.as_deref());

    match cmd {
        ConfigCommands::Get { key } => {
            let table = effective_table(&config)?;
            let value = lookup(&table, &key)
                .ok_or_else(|| CliError::invalid_input(format!("Unknown config key: '{key}'")))?;
            output.print(&render(value))?;
        }

        ConfigCommands::Set { key, value } => {
            set_in_file(&path, &key, &value)?;
            output.success(&format!("Set {key} = {value} in {}", path.display()))?;
        }

        ConfigCommands::List => {
            if output.format() == OutputFormat::Json {
                let json = serde_json::to_value(&config).map_err(|e| CliError::ConfigError {
                    message: format!("Failed to serialise config: {e}"),
                    source: Some(Box::new(e)),
                })?;
                output.json(&json)?;
            } else {
                output.header("Current Configuration:")?;
                let serialised =
                    toml::to_string_pretty(&config).map_err(|e| CliError::ConfigError {
                        message: format!("Failed to serialise config: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                output.print(&serialised)?;
            }
        }

        ConfigCommands::Path => {
            output.print(&path.display().to_string())?;
        }
    }

    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn effective_table(config: &AppConfig) -> CliResult<Table> {
    config
        .to_table()
        .map_err(|e| CliError::config("Failed to serialise config", e))
}

fn lookup<'a>(table: &'a Table, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = table.get(parts.next()?)?;
    for part in parts {
        current = current.as_table()?.get(part)?;
    }
    Some(current)
}

/// Strings print bare; everything else as TOML.
fn render(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Set `key` in the file at `path`, creating it if needed.
///
/// The key must exist in [`AppConfig`] and the edited file must still load.
fn set_in_file(path: &Path, key: &str, raw: &str) -> CliResult<()> {
    let known = effective_table(&settable())?;
    let Some(existing) = lookup(&known, key) else {
        return Err(CliError::invalid_input(format!("Unknown config key: '{key}'")));
    };
    if existing.is_table() {
        return Err(CliError::invalid_input(format!(
            "'{key}' is a section; set one of its keys instead"
        )));
    }

    let mut table: Table = if path.exists() {
        let text = std::fs::read_to_string(path)
            .with_cli_context(|| format!("Failed to read '{}'", path.display()))?;
        text.parse::<Table>().map_err(|e| CliError::ConfigError {
            message: format!("Failed to parse '{}'", path.display()),
            source: Some(Box::new(e)),
        })?
    } else {
        Table::new()
    };

    insert(&mut table, key, parse_value(existing, raw));

    let text = toml::to_string_pretty(&table).map_err(|e| CliError::ConfigError {
        message: "Failed to serialise config".into(),
        source: Some(Box::new(e)),
    })?;
    toml::from_str::<AppConfig>(&text).map_err(|e| CliError::ConfigError {
        message: format!("Value '{raw}' is not valid for '{key}'"),
        source: Some(Box::new(e)),
    })?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_cli_context(|| format!("Failed to create '{}'", parent.display()))?;
    }
    std::fs::write(path, text).with_cli_context(|| format!("Failed to write '{}'", path.display()))
}

/// Defaults with every optional key filled, so all keys show up.
fn settable() -> AppConfig {
    let mut config = AppConfig::default();
    let d = &mut config.defaults;
    for slot in [
        &mut d.database,
        &mut d.auth,
        &mut d.container,
        &mut d.migrations,
        &mut d.cache,
        &mut d.task_queue,
        &mut d.observability,
    ] {
        *slot = Some(String::new());
    }
    config.fragments.local_path = Some(Default::default());
    config
}

/// Booleans parse as booleans when the default is one; the rest stay strings.
fn parse_value(existing: &Value, raw: &str) -> Value {
    match (existing, raw.parse::<bool>()) {
        (Value::Boolean(_), Ok(b)) => Value::Boolean(b),
        _ => Value::String(raw.to_string()),
    }
}

fn insert(table: &mut Table, key: &str, value: Value) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(last) = parts.pop() else {
        return;
    };
    let mut current = table;
    for part in parts {
        let entry = current
            .entry(part.to_string())
            .or_insert_with(|| Value::Table(Table::new()));
        if !entry.is_table() {
            *entry = Value::Table(Table::new());
        }
        let Value::Table(next) = entry else {
            return;
        };
        current = next;
    }
    current.insert(last.to_string(), value);
}

// ── tests ─────────────────────────────────────────────────────────────────────
