//! Fragments: immutable trees of template files, keyed by stack and id.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::domain::value_objects::Stack;

/// One file inside a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFile {
    /// Path relative to the fragment root.
    pub path: PathBuf,
    /// Raw bytes; copied verbatim.
    pub contents: Vec<u8>,
}

impl FragmentFile {
    pub fn new(path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        Self {
            path: path.into(),
            contents: contents.into(),
        }
    }
}

/// A resolved fragment. Never references another fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub stack: Stack,
    pub id: String,
    pub files: Vec<FragmentFile>,
}

impl Fragment {
    pub fn new(stack: Stack, id: impl Into<String>, mut files: Vec<FragmentFile>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            stack,
            id: id.into(),
            files,
        }
    }

    pub fn file(&self, path: impl AsRef<Path>) -> Option<&FragmentFile> {
        let path = path.as_ref();
        self.files.iter().find(|f| f.path == path)
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl fmt::Display for Fragment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.stack, self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn files_are_kept_in_path_order() {
        let fragment = Fragment::new(
            Stack::FastApi,
            "redis",
            vec![
                FragmentFile::new("app/core/redis.py", "x"),
                FragmentFile::new("app/__init__.py", ""),
            ],
        );

        assert_eq!(fragment.files[0].path, PathBuf::from("app/__init__.py"));
        assert!(fragment.file("app/core/redis.py").is_some());
        assert_eq!(fragment.to_string(), "fastapi/redis");
    }
}
