//! CLI argument definitions using the clap derive API.
//!
//! This module is the *only* place that knows about argument names, aliases,
//! help text, and value enums.  No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use weld_core::domain::FeatureSlot;

pub mod global;
pub use global::{GlobalArgs, OutputFormat};

// ── Top-level CLI ─────────────────────────────────────────────────────────────

/// Main CLI entry-point.
#[derive(Debug, Parser)]
#[command(
    name    = "weld",
    bin_name = "weld",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Compose backend projects from feature fragments",
    long_about = "weld generates a FastAPI project from a base skeleton plus the \
                  features you pick, and can add features to a project later.",
    after_help = "EXAMPLES:\n\
        \x20 weld new shop --database postgresql --auth bearer --cache redis\n\
        \x20 weld new notes --database sqlite --yes --skip-install\n\
        \x20 weld add cache redis --path ./shop\n\
        \x20 weld features",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    /// Flags available on every subcommand.
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

/// All available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a new project.
    #[command(
        visible_alias = "n",
        about = "Create a new project",
        after_help = "EXAMPLES:\n\
            \x20 weld new shop --database postgresql --auth cookie --container docker\n\
            \x20 weld new ../api --database mongodb --task-queue taskiq --yes\n\
            \x20 weld new shop --database mysql --migrations alembic --dry-run"
    )]
    New(NewArgs),

    /// Add one feature to an existing project.
    #[command(
        about = "Add a feature to an existing project",
        after_help = "EXAMPLES:\n\
            \x20 weld add cache redis\n\
            \x20 weld add observability sentry --path ./shop\n\
            \x20 weld add auth            # prompts for the method"
    )]
    Add(AddArgs),

    /// List feature slots and their variants.
    #[command(
        visible_alias = "ls",
        about = "List available features",
        after_help = "EXAMPLES:\n\
            \x20 weld features\n\
            \x20 weld features --format json"
    )]
    Features(FeaturesArgs),

    /// Initialise a weld configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 weld init\n\
            \x20 weld init --force\n\
            \x20 weld --config ./weld-config.toml init"
    )]
    Init(InitArgs),

    /// Generate shell completion scripts.
    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 weld completions bash > ~/.local/share/bash-completion/completions/weld\n\
            \x20 weld completions zsh  > ~/.zfunc/_weld\n\
            \x20 weld completions fish > ~/.config/fish/completions/weld.fish"
    )]
    Completions(CompletionsArgs),

    /// Manage the weld configuration.
    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 weld config get defaults.database\n\
            \x20 weld config set defaults.database postgresql\n\
            \x20 weld config list"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

/// Arguments for `weld new`.
#[derive(Debug, Args)]
pub struct NewArgs {
    /// Project name or path.  A plain name creates `./name`; a path like
    /// `../foo` places the project one level up.
    #[arg(value_name = "NAME", help = "Project name or path")]
    pub name: String,

    /// Target stack. Defaults to the configured stack.
    #[arg(short = 's', long = "stack", value_name = "STACK", help = "Target stack")]
    pub stack: Option<String>,

    #[command(flatten)]
    pub features: FeatureFlags,

    /// Never prompt; unset slots take the configured default or `none`.
    #[arg(
        short = 'y',
        long = "yes",
        help = "Do not prompt; use defaults for unset features"
    )]
    pub yes: bool,

    /// Print the plan without writing any files.
    #[arg(long = "dry-run", help = "Show what would be created without creating")]
    pub dry_run: bool,

    #[arg(long = "skip-install", help = "Do not install packages")]
    pub skip_install: bool,
}

/// One optional flag per feature slot.
#[derive(Debug, Default, Args)]
pub struct FeatureFlags {
    #[arg(long = "database", visible_alias = "db", value_name = "ENGINE")]
    pub database: Option<String>,

    #[arg(long = "auth", value_name = "METHOD")]
    pub auth: Option<String>,

    #[arg(long = "container", value_name = "RUNTIME")]
    pub container: Option<String>,

    #[arg(long = "migrations", value_name = "TOOL")]
    pub migrations: Option<String>,

    #[arg(long = "cache", value_name = "BACKEND")]
    pub cache: Option<String>,

    #[arg(long = "task-queue", value_name = "QUEUE")]
    pub task_queue: Option<String>,

    #[arg(long = "observability", value_name = "PROVIDER")]
    pub observability: Option<String>,
}

impl FeatureFlags {
    /// Slots given on the command line, in priority order.
    pub fn explicit(&self) -> Vec<(FeatureSlot, String)> {
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

// ── add ───────────────────────────────────────────────────────────────────────

/// Arguments for `weld add`.
#[derive(Debug, Args)]
pub struct AddArgs {
    /// Slot to fill, e.g. `cache` or `task-queue`.
    #[arg(value_name = "SLOT")]
    pub slot: String,

    /// Variant to use. Prompted for when omitted.
    #[arg(value_name = "VARIANT")]
    pub variant: Option<String>,

    /// Project root holding `weld.toml`.
    #[arg(short = 'p', long = "path", value_name = "DIR", default_value = ".")]
    pub path: PathBuf,

    #[arg(long = "skip-install", help = "Do not install packages")]
    pub skip_install: bool,
}

// ── features ──────────────────────────────────────────────────────────────────

/// Arguments for `weld features`.
#[derive(Debug, Args)]
pub struct FeaturesArgs {
    /// Output format.
    #[arg(
        long = "format",
        value_enum,
        default_value = "table",
        help = "Output format"
    )]
    pub format: ListFormat,
}

/// Output format for the `features` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One `slot=variant` per line.
    List,
    /// JSON object keyed by slot.
    Json,
}

// ── init ──────────────────────────────────────────────────────────────────────

/// Arguments for `weld init`.
#[derive(Debug, Args)]
pub struct InitArgs {
    /// Overwrite an existing config file.
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

/// Arguments for `weld completions`.
#[derive(Debug, Args)]
pub struct CompletionsArgs {
    /// Target shell.
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

/// Supported shells for completion generation.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

/// Subcommands for `weld config`.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.database`.
        key: String,
    },
    /// Set a configuration key to a value.
    Set {
        /// Dotted key path.
        key: String,
        /// New value.
        value: String,
    },
    /// Print all configuration values.
    List,
    /// Print the path to the active configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn verify_cli_structure() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parse_new_with_feature_flags() {
        let cli = Cli::parse_from([
            "weld",
            "new",
            "shop",
            "--db",
            "postgres",
            "--task-queue",
            "taskiq",
            "--yes",
        ]);
        let Commands::New(args) = cli.command else {
            panic!("expected New command");
        };
        assert_eq!(
            args.features.explicit(),
            vec![
                (FeatureSlot::Database, "postgres".to_string()),
                (FeatureSlot::TaskQueue, "taskiq".to_string()),
            ]
        );
        assert!(args.yes);
        assert!(!args.dry_run);
    }

    #[test]
    fn add_defaults_to_current_directory() {
        let cli = Cli::parse_from(["weld", "add", "cache", "redis"]);
        let Commands::Add(args) = cli.command else {
            panic!("expected Add command");
        };
        assert_eq!(args.slot, "cache");
        assert_eq!(args.variant.as_deref(), Some("redis"));
        assert_eq!(args.path, PathBuf::from("."));
    }

    #[test]
    fn add_variant_is_optional() {
        let cli = Cli::parse_from(["weld", "add", "auth", "-p", "../shop"]);
        let Commands::Add(args) = cli.command else {
            panic!("expected Add command");
        };
        assert!(args.variant.is_none());
    }

    #[test]
    fn quiet_and_verbose_conflict() {
        let result = Cli::try_parse_from(["weld", "--quiet", "--verbose", "features"]);
        assert!(result.is_err());
    }
}
