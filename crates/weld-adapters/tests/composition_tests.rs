//! End-to-end composition over the embedded fragment library and the real
//! filesystem.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::TempDir;
use weld_adapters::{EmbeddedFragmentStore, LocalFilesystem, TomlManifestStore};
use weld_core::application::{ApplicationError, CatalogDependencyResolver};
use weld_core::domain::mutation::{self, LifecycleHook, ModelRegistration, Registry};
use weld_core::domain::{FeatureSlot, MANIFEST_FILE};
use weld_core::prelude::*;

fn composer() -> FeatureComposer {
    FeatureComposer::new(
        Arc::new(LocalFilesystem::new()),
        Arc::new(EmbeddedFragmentStore::new()),
        Arc::new(TomlManifestStore::new()),
        Arc::new(CatalogDependencyResolver),
    )
}

fn offline() -> ComposeOptions {
    ComposeOptions {
        install: false,
        format: false,
    }
}

fn selection(pairs: &[(&str, &str)]) -> FeatureSelection {
    FeatureSelection::from_pairs(pairs.iter().copied()).unwrap()
}

fn compose(parent: &Path, name: &str, pairs: &[(&str, &str)]) -> PathBuf {
    let destination = parent.join(name);
    composer()
        .compose(Stack::FastApi, selection(pairs), &destination, offline())
        .unwrap();
    destination
}

fn read(root: &Path, file: &str) -> String {
    fs::read_to_string(root.join(file)).unwrap()
}

/// Every file below `root` with its bytes, keyed by relative path.
fn snapshot(root: &Path) -> Vec<(PathBuf, Vec<u8>)> {
    let mut out = Vec::new();
    let mut pending = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        for entry in fs::read_dir(&dir).unwrap() {
            let path = entry.unwrap().path();
            if path.is_dir() {
                pending.push(path);
            } else {
                let relative = path.strip_prefix(root).unwrap().to_path_buf();
                out.push((relative, fs::read(&path).unwrap()));
            }
        }
    }
    out.sort();
    out
}

/// Lines of one compose service block, header excluded.
fn service_block<'a>(compose: &'a str, name: &str) -> Vec<&'a str> {
    let header = format!("  {name}:");
    compose
        .lines()
        .skip_while(|l| *l != header)
        .skip(1)
        .take_while(|l| l.is_empty() || l.starts_with("    "))
        .collect()
}

#[test]
fn composing_twice_yields_identical_trees() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let pairs = [
        ("database", "postgresql"),
        ("auth", "cookie"),
        ("cache", "redis"),
        ("container", "docker"),
    ];

    let first = compose(a.path(), "shop", &pairs);
    let second = compose(b.path(), "shop", &pairs);

    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn request_order_does_not_matter() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();

    let first = compose(
        a.path(),
        "shop",
        &[("task-queue", "taskiq"), ("database", "sqlite"), ("observability", "sentry")],
    );
    let second = compose(
        b.path(),
        "shop",
        &[("observability", "sentry"), ("database", "sqlite"), ("task-queue", "taskiq")],
    );

    assert_eq!(snapshot(&first), snapshot(&second));
}

#[test]
fn sqlite_without_auth_entry_point() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "notes", &[("database", "sqlite")]);

    let main = read(&project, "app/main.py");
    assert_eq!(main.matches("async def lifespan(").count(), 1);
    assert_eq!(main.matches("lifespan=lifespan").count(), 1);
    assert_eq!(main.matches("await init_db()").count(), 1);
    assert_eq!(main.matches("await close_db()").count(), 1);
    assert!(main.contains("Depends(get_session)"));
    assert!(!main.contains("admin.command"));

    let routers = read(&project, "app/routers/main.py");
    assert!(!routers.contains("auth_router"));
    assert!(!project.join("app/routers/auth").exists());
    assert!(read(&project, "app/repositories/base.py").contains("AsyncSession"));
    assert!(!project.join("app/services").exists());
}

#[test]
fn lifecycle_hook_is_a_no_op_on_second_run() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "notes", &[("database", "sqlite"), ("cache", "redis")]);

    let main = read(&project, "app/main.py");
    for hook in [LifecycleHook::Database, LifecycleHook::Cache] {
        assert_eq!(mutation::run(&hook, &main).unwrap(), None);
    }
}

#[test]
fn mongo_with_bearer_registers_user_once() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "accounts", &[("database", "mongodb"), ("auth", "bearer")]);

    let model = read(&project, "app/models/user.py");
    assert!(model.contains("class User(Document):"));
    assert!(read(&project, "app/repositories/base.py").contains("bound=Document"));
    assert!(project.join("app/services/base.py").is_file());

    let db = read(&project, "app/core/db.py");
    assert!(db.contains("document_models=[User]"));
    assert_eq!(db.matches("from app.models.user import User").count(), 1);

    let registration = ModelRegistration::user(Registry::Document);
    assert_eq!(mutation::run(&registration, &db).unwrap(), None);

    let main = read(&project, "app/main.py");
    assert!(main.contains("await db.client.admin.command(\"ping\")"));
    let routers = read(&project, "app/routers/main.py");
    assert_eq!(routers.matches("api_router.include_router(auth_router)").count(), 1);
    assert_eq!(routers.matches("api_router.include_router(users_router)").count(), 1);
}

#[test]
fn existing_destination_leaves_nothing_behind() {
    let dir = TempDir::new().unwrap();
    let destination = dir.path().join("shop");
    fs::write(&destination, "not a project").unwrap();

    let err = composer()
        .compose(
            Stack::FastApi,
            selection(&[("database", "sqlite")]),
            &destination,
            offline(),
        )
        .unwrap_err();

    assert!(matches!(
        err,
        WeldError::Application(ApplicationError::DestinationExists { .. })
    ));
    let entries: Vec<_> = fs::read_dir(dir.path()).unwrap().collect();
    assert_eq!(entries.len(), 1);
    assert_eq!(fs::read_to_string(&destination).unwrap(), "not a project");
}

#[test]
fn full_compose_stack_lists_each_service_once() {
    let dir = TempDir::new().unwrap();
    let project = compose(
        dir.path(),
        "shop",
        &[
            ("database", "postgresql"),
            ("cache", "redis"),
            ("task-queue", "taskiq"),
            ("container", "docker"),
        ],
    );

    let compose = read(&project, "docker-compose.yaml");
    for service in ["db", "redis", "worker"] {
        let header = format!("  {service}:");
        assert_eq!(
            compose.lines().filter(|l| *l == header).count(),
            1,
            "{service} in\n{compose}"
        );
    }
    assert!(!compose.contains("# DATABASE_SERVICE"));
    assert!(compose.contains("image: postgres:16-alpine"));

    let app = service_block(&compose, "app");
    assert_eq!(app.iter().filter(|l| l.trim() == "redis:").count(), 1);
    assert_eq!(app.iter().filter(|l| l.trim() == "db:").count(), 1);
    let worker = service_block(&compose, "worker");
    assert_eq!(worker.iter().filter(|l| l.trim() == "redis:").count(), 1);
}

#[test]
fn env_files_and_settings_are_filled() {
    let dir = TempDir::new().unwrap();
    let project = compose(
        dir.path(),
        "shop-api",
        &[("database", "postgresql"), ("auth", "bearer"), ("observability", "sentry")],
    );

    let env = read(&project, ".env");
    let keys: Vec<&str> = env
        .lines()
        .filter_map(|l| l.split_once('=').map(|(k, _)| k))
        .collect();
    assert_eq!(
        keys,
        vec![
            "PROJECT_NAME",
            "ENVIRONMENT",
            "DEBUG",
            "DB_HOST",
            "DB_PORT",
            "DB_USER",
            "DB_PASSWORD",
            "DB_NAME",
            "SECRET_KEY",
            "ACCESS_TOKEN_EXPIRE_MINUTES",
            "SENTRY_DSN",
        ]
    );
    assert!(env.contains("PROJECT_NAME=shop-api\n"));
    assert!(env.contains("DB_NAME=shop_api\n"));
    assert_eq!(env, read(&project, ".env.example"));

    let config = read(&project, "app/core/config.py");
    assert!(config.contains("DATABASE_ENGINE: str = \"postgresql\""));
    assert!(config.contains("USER_STORE: str = \"postgresql\""));
    assert!(config.contains("    # cache settings: none"));
    assert!(!config.contains("__"));

    let pyproject = read(&project, "pyproject.toml");
    assert!(pyproject.contains("name = \"shop-api\""));
}

#[test]
fn manifest_records_enabled_slots() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "shop", &[("database", "mysql"), ("migrations", "alembic")]);

    let manifest = TomlManifestStore::new().load(&project).unwrap();
    assert_eq!(manifest.project_name, "shop");
    assert_eq!(manifest.variant(FeatureSlot::Database), "mysql");
    assert_eq!(manifest.variant(FeatureSlot::Migrations), "alembic");
    assert_eq!(manifest.variant(FeatureSlot::Cache), "none");
    assert!(project.join(MANIFEST_FILE).is_file());
    assert!(project.join("alembic.ini").is_file());
}

#[test]
fn adding_a_feature_matches_a_fresh_composition() {
    let dir = TempDir::new().unwrap();
    let added = compose(dir.path(), "shop", &[("database", "postgresql")]);

    let report = composer()
        .add_feature(&added, FeatureSlot::Cache, "redis", offline())
        .unwrap();
    assert_eq!(report.fragments, vec!["redis"]);
    assert_eq!(report.skipped, vec!["lifespan-wrapper"]);
    assert_eq!(report.packages, vec!["redis"]);

    let fresh_dir = TempDir::new().unwrap();
    let fresh = compose(fresh_dir.path(), "shop", &[("database", "postgresql"), ("cache", "redis")]);

    for file in ["app/main.py", "app/core/config.py", ".env", "app/core/redis.py"] {
        assert_eq!(read(&added, file), read(&fresh, file), "{file} differs");
    }

    let manifest = TomlManifestStore::new().load(&added).unwrap();
    assert_eq!(manifest.variant(FeatureSlot::Cache), "redis");
}

#[test]
fn adding_an_enabled_slot_is_rejected() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "shop", &[("database", "sqlite")]);
    let before = snapshot(&project);

    let err = composer()
        .add_feature(&project, FeatureSlot::Database, "postgresql", offline())
        .unwrap_err();

    assert!(matches!(
        err,
        WeldError::Application(ApplicationError::FeatureAlreadyEnabled { .. })
    ));
    assert_eq!(snapshot(&project), before);
}

#[test]
fn adding_a_feature_ignores_virtualenv_and_user_files() {
    let dir = TempDir::new().unwrap();
    let project = compose(dir.path(), "shop", &[("database", "sqlite")]);
    let license = project.join(".venv/lib/pkg/LICENSE.txt");
    fs::create_dir_all(license.parent().unwrap()).unwrap();
    fs::write(&license, b"Copyright \xe9 2020\n").unwrap();
    fs::write(project.join("NOTES.md"), "__PROJECT_NAME__ by hand\n").unwrap();

    composer()
        .add_feature(&project, FeatureSlot::Cache, "redis", offline())
        .unwrap();

    assert!(read(&project, "app/main.py").contains("await init_redis()"));
    assert_eq!(read(&project, "NOTES.md"), "__PROJECT_NAME__ by hand\n");
    assert_eq!(fs::read(&license).unwrap(), b"Copyright \xe9 2020\n");
    let manifest = TomlManifestStore::new().load(&project).unwrap();
    assert_eq!(manifest.variant(FeatureSlot::Cache), "redis");
}
