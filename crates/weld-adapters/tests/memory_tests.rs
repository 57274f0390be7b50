//! The composer over an in-memory filesystem: nothing touches the disk.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use weld_adapters::{EmbeddedFragmentStore, MemoryFilesystem};
use weld_core::application::{ApplicationError, CatalogDependencyResolver};
use weld_core::prelude::*;

#[derive(Default)]
struct Manifests(Mutex<BTreeMap<PathBuf, ProjectManifest>>);

impl ManifestStore for Manifests {
    fn load(&self, project_root: &Path) -> WeldResult<ProjectManifest> {
        self.0
            .lock()
            .unwrap()
            .get(project_root)
            .cloned()
            .ok_or_else(|| {
                ApplicationError::ManifestNotFound {
                    path: project_root.to_path_buf(),
                }
                .into()
            })
    }

    fn save(&self, project_root: &Path, manifest: &ProjectManifest) -> WeldResult<()> {
        self.0
            .lock()
            .unwrap()
            .insert(project_root.to_path_buf(), manifest.clone());
        Ok(())
    }
}

fn composer(fs: &MemoryFilesystem) -> FeatureComposer {
    FeatureComposer::new(
        Arc::new(fs.clone()),
        Arc::new(EmbeddedFragmentStore::new()),
        Arc::new(Manifests::default()),
        Arc::new(CatalogDependencyResolver),
    )
}

fn offline() -> ComposeOptions {
    ComposeOptions {
        install: false,
        format: false,
    }
}

#[test]
fn compose_publishes_only_the_destination() {
    let fs = MemoryFilesystem::new();
    let selection =
        FeatureSelection::from_pairs([("database", "postgresql"), ("cache", "redis")]).unwrap();

    composer(&fs)
        .compose(Stack::FastApi, selection, Path::new("/work/shop"), offline())
        .unwrap();

    let files = fs.files();
    assert!(files.iter().all(|p| p.starts_with("/work/shop")), "{files:?}");
    assert!(files.contains(&PathBuf::from("/work/shop/app/core/redis.py")));

    let main = fs.read_file(Path::new("/work/shop/app/main.py")).unwrap();
    assert!(main.contains("await init_db()"));
    assert!(main.contains("await init_redis()"));
}

#[test]
fn in_memory_and_on_disk_compositions_match() {
    let fs = MemoryFilesystem::new();
    let pairs = [("database", "sqlite"), ("auth", "cookie")];

    composer(&fs)
        .compose(
            Stack::FastApi,
            FeatureSelection::from_pairs(pairs).unwrap(),
            Path::new("/work/notes"),
            offline(),
        )
        .unwrap();

    let disk = tempfile::tempdir().unwrap();
    let destination = disk.path().join("notes");
    FeatureComposer::new(
        Arc::new(weld_adapters::LocalFilesystem::new()),
        Arc::new(EmbeddedFragmentStore::new()),
        Arc::new(weld_adapters::TomlManifestStore::new()),
        Arc::new(CatalogDependencyResolver),
    )
    .compose(
        Stack::FastApi,
        FeatureSelection::from_pairs(pairs).unwrap(),
        &destination,
        offline(),
    )
    .unwrap();

    for file in ["app/main.py", "app/core/config.py", "app/routers/main.py", ".env"] {
        let memory = fs.read_file(&Path::new("/work/notes").join(file)).unwrap();
        let on_disk = std::fs::read_to_string(destination.join(file)).unwrap();
        assert_eq!(memory, on_disk, "{file}");
    }
}
