//! Token Service - placeholder substitution over a tree or a file list.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, instrument};

use crate::application::ports::Filesystem;
use crate::domain::{TokenSet, is_text_file};
use crate::error::WeldResult;

/// Counts from one substitution pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SubstitutionStats {
    pub scanned: usize,
    pub rewritten: usize,
}

pub struct TokenService {
    filesystem: Arc<dyn Filesystem>,
}

impl TokenService {
    pub fn new(filesystem: Arc<dyn Filesystem>) -> Self {
        Self { filesystem }
    }

    /// Replace known markers in every text file under `root`.
    ///
    /// Files are handled one at a time and only rewritten when something
    /// changed. Binary files are never opened.
    #[instrument(skip_all, fields(root = %root.display()))]
    pub fn substitute(&self, root: &Path, tokens: &TokenSet) -> WeldResult<SubstitutionStats> {
        let files = self.filesystem.list_files(root)?;
        self.rewrite_all(files, tokens)
    }

    /// Replace known markers in the listed files only.
    ///
    /// Paths are relative to `root`. Missing files are skipped.
    #[instrument(skip_all, fields(root = %root.display(), files = files.len()))]
    pub fn substitute_files(
        &self,
        root: &Path,
        files: &[PathBuf],
        tokens: &TokenSet,
    ) -> WeldResult<SubstitutionStats> {
        let present = files
            .iter()
            .map(|f| root.join(f))
            .filter(|p| self.filesystem.exists(p))
            .collect();
        self.rewrite_all(present, tokens)
    }

    fn rewrite_all(&self, paths: Vec<PathBuf>, tokens: &TokenSet) -> WeldResult<SubstitutionStats> {
        let mut stats = SubstitutionStats::default();

        for path in paths {
            if !is_text_file(&path) {
                continue;
            }
            stats.scanned += 1;

            let content = self.filesystem.read_to_string(&path)?;
            if let Some(replaced) = tokens.substitute(&content) {
                self.filesystem.write_file(&path, replaced.as_bytes())?;
                stats.rewritten += 1;
                debug!(path = %path.display(), "Substituted tokens");
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::MemoryFs;

    #[test]
    fn rewrites_only_files_with_known_markers() {
        let fs = Arc::new(MemoryFs::default());
        fs.put("/p/pyproject.toml", "name = \"__PROJECT_NAME_KEBAB__\"\n");
        fs.put("/p/app/__init__.py", "__all__ = []\n");
        fs.put("/p/logo.png", "__PROJECT_NAME__");
        fs.put("/p/.env", "PROJECT_NAME=__PROJECT_NAME__\n");

        let stats = TokenService::new(fs.clone())
            .substitute(Path::new("/p"), &TokenSet::for_project("Shop API"))
            .unwrap();

        assert_eq!(stats, SubstitutionStats { scanned: 3, rewritten: 2 });
        assert_eq!(fs.read("/p/pyproject.toml").as_deref(), Some("name = \"shop-api\"\n"));
        assert_eq!(fs.read("/p/.env").as_deref(), Some("PROJECT_NAME=Shop API\n"));
        assert_eq!(fs.read("/p/app/__init__.py").as_deref(), Some("__all__ = []\n"));
        assert_eq!(fs.read("/p/logo.png").as_deref(), Some("__PROJECT_NAME__"));
    }

    #[test]
    fn second_pass_rewrites_nothing() {
        let fs = Arc::new(MemoryFs::default());
        fs.put("/p/README.md", "# __PROJECT_NAME__\n");
        let service = TokenService::new(fs);
        let tokens = TokenSet::for_project("demo");

        assert_eq!(service.substitute(Path::new("/p"), &tokens).unwrap().rewritten, 1);
        assert_eq!(service.substitute(Path::new("/p"), &tokens).unwrap().rewritten, 0);
    }

    #[test]
    fn listed_files_only() {
        let fs = Arc::new(MemoryFs::default());
        fs.put("/p/app/core/redis.py", "NAME = \"__PROJECT_NAME__\"\n");
        fs.put("/p/notes.md", "keep __PROJECT_NAME__ as written\n");

        let stats = TokenService::new(fs.clone())
            .substitute_files(
                Path::new("/p"),
                &[PathBuf::from("app/core/redis.py"), PathBuf::from("missing.py")],
                &TokenSet::for_project("shop"),
            )
            .unwrap();

        assert_eq!(stats, SubstitutionStats { scanned: 1, rewritten: 1 });
        assert_eq!(fs.read("/p/app/core/redis.py").as_deref(), Some("NAME = \"shop\"\n"));
        assert_eq!(
            fs.read("/p/notes.md").as_deref(),
            Some("keep __PROJECT_NAME__ as written\n")
        );
    }
}
