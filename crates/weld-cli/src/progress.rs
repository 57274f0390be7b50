//! Spinners around the slow post-compose steps.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use weld_core::application::{CodeFormatter, PackageInstaller};
use weld_core::error::WeldResult;

/// Wraps an installer or formatter and draws a spinner while it runs.
pub struct Spinning<T: ?Sized> {
    inner: Arc<T>,
    visible: bool,
}

impl<T: ?Sized> Spinning<T> {
    pub fn new(inner: Arc<T>, visible: bool) -> Self {
        Self { inner, visible }
    }

    fn spinner(&self, message: String) -> ProgressBar {
        if !self.visible {
            return ProgressBar::hidden();
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_message(message);
        bar.enable_steady_tick(Duration::from_millis(80));
        bar
    }
}

impl PackageInstaller for Spinning<dyn PackageInstaller> {
    fn install(&self, packages: &[String], destination: &Path) -> WeldResult<()> {
        let bar = self.spinner(format!("Installing {} packages", packages.len()));
        let result = self.inner.install(packages, destination);
        bar.finish_and_clear();
        result
    }
}

impl CodeFormatter for Spinning<dyn CodeFormatter> {
    fn format(&self, destination: &Path) -> WeldResult<()> {
        let bar = self.spinner("Formatting sources".to_string());
        let result = self.inner.format(destination);
        bar.finish_and_clear();
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl PackageInstaller for Recorder {
        fn install(&self, packages: &[String], _destination: &Path) -> WeldResult<()> {
            self.0.lock().unwrap().extend(packages.iter().cloned());
            Ok(())
        }
    }

    #[test]
    fn hidden_spinner_still_delegates() {
        let recorder = Arc::new(Recorder::default());
        let inner: Arc<dyn PackageInstaller> = recorder.clone();
        Spinning::new(inner, false)
            .install(&["redis".to_string()], Path::new("."))
            .unwrap();
        assert_eq!(*recorder.0.lock().unwrap(), vec!["redis".to_string()]);
    }
}
