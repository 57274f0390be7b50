//! Application configuration.
//!
//! [`AppConfig`] is loaded once at startup and passed down by reference.
//! The CLI layer owns config; the core crate never sees it.
//!
//! # Resolution order (highest priority first)
//!
//! 1. CLI flags (handled at the call-site, not here)
//! 2. Environment variables: `WELD_<SECTION>__<KEY>`, e.g.
//!    `WELD_DEFAULTS__DATABASE=postgresql`
//! 3. Config file (`--config`, else the platform config dir)
//! 4. Built-in defaults (always present)

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use weld_core::domain::FeatureSlot;

/// Prefix for environment overrides.
pub const ENV_PREFIX: &str = "WELD";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default values for new projects.
    pub defaults: Defaults,
    /// Output settings.
    pub output: OutputConfig,
    /// Where fragments come from.
    pub fragments: FragmentConfig,
    /// Post-compose tooling.
    pub installer: InstallerConfig,
}

/// Per-slot defaults used when a slot is neither passed nor prompted for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub stack: String,
    pub database: Option<String>,
    pub auth: Option<String>,
    pub container: Option<String>,
    pub migrations: Option<String>,
    pub cache: Option<String>,
    pub task_queue: Option<String>,
    pub observability: Option<String>,
    pub skip_install: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub no_color: bool,
    /// `human`, `plain` or `json`; used when `--output-format` is `auto`.
    pub format: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Read fragments from this directory instead of the built-in library.
    pub local_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallerConfig {
    /// Package manager binary, invoked as `<command> add <packages>`.
    pub command: String,
    /// Run the code formatter after composing.
    pub format_code: bool,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            stack: "fastapi".into(),
            database: None,
            auth: None,
            container: None,
            migrations: None,
            cache: None,
            task_queue: None,
            observability: None,
            skip_install: false,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            no_color: false,
            format: "human".into(),
        }
    }
}

impl Default for InstallerConfig {
    fn default() -> Self {
        Self {
            command: "uv".into(),
            format_code: true,
        }
    }
}

impl Defaults {
    /// Configured slot defaults, in priority order.
    pub fn slot_pairs(&self) -> Vec<(FeatureSlot, String)> {
        [
            (FeatureSlot::Database, &self.database),
            (FeatureSlot::Auth, &self.auth),
            (FeatureSlot::Container, &self.container),
            (FeatureSlot::Migrations, &self.migrations),
            (FeatureSlot::Cache, &self.cache),
            (FeatureSlot::TaskQueue, &self.task_queue),
            (FeatureSlot::Observability, &self.observability),
        ]
        .into_iter()
        .filter_map(|(slot, value)| value.clone().map(|v| (slot, v)))
        .collect()
    }
}

impl AppConfig {
    /// Load configuration: serialised defaults, then the file, then the
    /// environment.
    ///
    /// `config_file` is the path passed via `--config`; without it the
    /// platform default is used.  A missing file is not an error, a
    /// malformed one is.
    pub fn load(config_file: Option<&Path>) -> anyhow::Result<Self> {
        let path = Self::resolve_path(config_file);
        Self::load_from(&path, Environment::with_prefix(ENV_PREFIX))
    }

    fn load_from(path: &Path, environment: Environment) -> anyhow::Result<Self> {
        let defaults = toml::to_string(&Self::default()).context("Failed to serialise defaults")?;
        let config = Config::builder()
            .add_source(File::from_str(&defaults, FileFormat::Toml))
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(environment.prefix_separator("_").separator("__"))
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        config
            .try_deserialize()
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    /// The file `load` reads: `--config` when given, else [`Self::config_path`].
    pub fn resolve_path(config_file: Option<&Path>) -> PathBuf {
        config_file
            .map(Path::to_path_buf)
            .unwrap_or_else(Self::config_path)
    }

    /// Path to the default configuration file.
    ///
    /// Uses `directories::ProjectDirs`, falling back to `.weld.toml` in the
    /// current directory.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "weld", "weld")
            .map(|d| d.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from(".weld.toml"))
    }

    /// The configuration as a TOML table, for dotted-key lookups.
    pub fn to_table(&self) -> anyhow::Result<toml::Table> {
        match toml::Value::try_from(self).context("Failed to serialise configuration")? {
            toml::Value::Table(table) => Ok(table),
            other => anyhow::bail!("Configuration serialised to a {}", other.type_str()),
        }
    }
}
