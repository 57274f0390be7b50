//! Environment Service - merges feature keys into dotenv files.

use std::path::Path;
use std::sync::Arc;

use tracing::debug;

use crate::application::ports::Filesystem;
use crate::domain::{EnvRecord, EnvVar};
use crate::error::WeldResult;

pub struct EnvService {
    filesystem: Arc<dyn Filesystem>,
}

impl EnvService {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Merge `updates` into the file at `path`, creating it if absent.
    ///
    /// Returns `true` if the file was written.
    pub fn merge(&self, path: &Path, updates: &[EnvVar]) -> WeldResult<bool> {
        let existed = self.filesystem.exists(path);
        let mut record = if existed {
            EnvRecord::parse(&self.filesystem.read_to_string(path)?)
        } else {
            EnvRecord::default()
        };

        if !record.merge(updates) && existed {
            debug!(path = %path.display(), "Environment already up to date");
            return Ok(false);
        }

        self.filesystem.write_file(path, record.render().as_bytes())?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryFs;

    #[test]
    fn creates_missing_file_and_keeps_order() {
        let fs = Arc::new(MemoryFs::default());
        let service = EnvService::new(fs.clone());
        let path = Path::new("/p/.env");

        service.merge(path, &[EnvVar::new("DB_PATH", "x")]).unwrap();
        service.merge(path, &[EnvVar::new("DB_PORT", "5432")]).unwrap();

        assert_eq!(fs.read(path).as_deref(), Some("DB_PATH=x\nDB_PORT=5432\n"));
    }

    #[test]
    fn unchanged_file_is_not_rewritten() {
        let fs = Arc::new(MemoryFs::default());
        fs.put("/p/.env", "# keep\nREDIS_URL=redis://localhost:6379/0\n");
        let service = EnvService::new(fs.clone());

        let written = service
            .merge(
                Path::new("/p/.env"),
                &[EnvVar::new("REDIS_URL", "redis://localhost:6379/0")],
            )
            .unwrap();

        assert!(!written);
        assert_eq!(
            fs.read("/p/.env").as_deref(),
            Some("# keep\nREDIS_URL=redis://localhost:6379/0\n")
        );
    }
}
