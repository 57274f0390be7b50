//! External tools run inside a generated project: the package installer
//! and the code formatter.

use std::path::Path;
use std::process::{Command, Output, Stdio};

use tracing::{debug, instrument};
use weld_core::application::ApplicationError;
use weld_core::application::ports::{CodeFormatter, PackageInstaller};
use weld_core::error::WeldResult;

/// Installs packages with `uv add`.
#[derive(Debug, Clone)]
pub struct UvInstaller {
    program: String,
}

impl UvInstaller {
    pub fn new() -> Self {
        Self::with_command("uv")
    }

    /// Use another `uv`-compatible executable.
    pub fn with_command(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    pub fn program(&self) -> &str {
        &self.program
    }
}

impl Default for UvInstaller {
    fn default() -> Self {
        Self::new()
    }
}

impl PackageInstaller for UvInstaller {
    #[instrument(skip_all, fields(program = %self.program, count = packages.len()))]
    fn install(&self, packages: &[String], destination: &Path) -> WeldResult<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let mut command = Command::new(&self.program);
        command.arg("add").args(packages).current_dir(destination);
        run(&self.program, command)
    }
}

/// Formats Python sources with `uvx black`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BlackFormatter;

impl CodeFormatter for BlackFormatter {
    fn format(&self, destination: &Path) -> WeldResult<()> {
        let mut command = Command::new("uvx");
        command
            .args(["black", "--quiet", "."])
            .current_dir(destination);
        run("uvx", command)
    }
}

fn run(program: &str, mut command: Command) -> WeldResult<()> {
    debug!(?command, "Running");
    let output = command
        .stdin(Stdio::null())
        .output()
        .map_err(|e| ApplicationError::ProcessFailed {
            program: program.to_string(),
            reason: format!("could not start: {e}"),
        })?;

    if output.status.success() {
        Ok(())
    } else {
        Err(ApplicationError::ProcessFailed {
            program: program.to_string(),
            reason: failure_reason(&output),
        }
        .into())
    }
}

/// Exit status plus the last line the tool printed on stderr.
fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) => format!("{}: {}", output.status, line.trim()),
        None => output.status.to_string(),
    }
}
