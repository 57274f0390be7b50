//! Flags accepted by every weld subcommand, before or after its name.

use std::path::PathBuf;

use clap::{ArgAction, Args, ValueEnum};

use crate::config::AppConfig;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Log more: -v info, -vv debug, -vvv trace. Warnings and errors are
    /// always logged.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Print errors only. Prompts are skipped and configured defaults used.
    #[arg(short = 'q', long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Plain output without ANSI colors.
    #[arg(long = "no-color", global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// weld settings file to read instead of the per-user one.
    #[arg(short = 'c', long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fragment library on disk, replacing the built-in one.
    #[arg(
        long = "fragments-dir",
        global = true,
        value_name = "DIR",
        env = "WELD_FRAGMENTS_DIR"
    )]
    pub fragments_dir: Option<PathBuf>,

    /// Report format. `json` prints one JSON document on stdout and JSON
    /// log lines on stderr.
    #[arg(long = "output-format", global = true, value_enum, default_value = "auto")]
    pub output_format: OutputFormat,
}

impl GlobalArgs {
    /// Fold flag overrides into the loaded settings.
    pub fn apply_to(&self, config: &mut AppConfig) {
        if let Some(dir) = &self.fragments_dir {
            config.fragments.local_path = Some(dir.clone());
        }
        if self.no_color {
            config.output.no_color = true;
        }
    }
}

/// How reports are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// `human` on a terminal, `plain` otherwise, unless the settings file
    /// says otherwise.
    #[default]
    Auto,
    Human,
    Plain,
    Json,
}
