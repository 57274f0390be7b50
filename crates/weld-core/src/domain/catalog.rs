//! What each feature contributes to a project.
//!
//! One [`Recipe`] per enabled feature: the fragments to copy, the
//! mutations to run, the environment keys, the packages and the settings
//! block. Recipes are pure data; the composer decides when each part runs.

use crate::domain::env_record::EnvVar;
use crate::domain::mutation::{
    ComposeDatabase, ComposeDependency, ComposeService, HealthCheck, HealthEndpoint,
    LifecycleHook, LifespanWrapper, ModelRegistration, Mutation, ObservabilityInit, Registry,
    RouterInclude,
};
use crate::domain::plan::PlannedMutation;
use crate::domain::selection::{Feature, FeatureSelection};
use crate::domain::tokens::{BlockKind, ConfigBlock};
use crate::domain::value_objects::{
    Auth, Cache, Container, Database, FeatureSlot, Migrations, Observability, SlotVariant, Stack,
    TaskQueue,
};

/// Well-known generated files, relative to the project root.
pub mod paths {
    pub const ENTRY_POINT: &str = "app/main.py";
    pub const ROUTERS: &str = "app/routers/main.py";
    pub const DATABASE: &str = "app/core/db.py";
    pub const SETTINGS: &str = "app/core/config.py";
    pub const COMPOSE: &str = "docker-compose.yaml";
    pub const ENV: &str = ".env";
    pub const ENV_EXAMPLE: &str = ".env.example";

    /// Environment files every feature merges into.
    pub const ENV_FILES: &[&str] = &[ENV, ENV_EXAMPLE];

    /// Whether a root-relative file path lies inside a dot-directory
    /// (`.git`, `.venv`, ...). Dotfiles themselves are not hidden.
    pub fn in_hidden_dir(relative: &std::path::Path) -> bool {
        relative.parent().is_some_and(|dir| {
            dir.components()
                .any(|c| c.as_os_str().to_str().is_some_and(|s| s.starts_with('.')))
        })
    }
}

/// Fragment every project starts from.
pub const BASE_FRAGMENT: &str = "base";

/// Settings section a slot fills, if any.
pub fn block_kind(slot: FeatureSlot) -> Option<BlockKind> {
    match slot {
        FeatureSlot::Database => Some(BlockKind::Database),
        FeatureSlot::Auth => Some(BlockKind::Auth),
        FeatureSlot::Cache => Some(BlockKind::Cache),
        FeatureSlot::TaskQueue => Some(BlockKind::TaskQueue),
        FeatureSlot::Observability => Some(BlockKind::Observability),
        FeatureSlot::Container | FeatureSlot::Migrations => None,
    }
}

/// Packages every project of `stack` needs.
pub fn base_packages(stack: Stack) -> &'static [&'static str] {
    match stack {
        Stack::FastApi => &["fastapi[standard]", "pydantic-settings"],
    }
}

/// Packages a single feature needs.
pub fn packages(stack: Stack, feature: Feature) -> &'static [&'static str] {
    match stack {
        Stack::FastApi => match feature {
            Feature::Database(Database::Sqlite) => &["sqlmodel", "aiosqlite", "greenlet"],
            Feature::Database(Database::Postgresql) => &["sqlmodel", "asyncpg", "greenlet"],
            Feature::Database(Database::Mysql) => {
                &["sqlmodel", "aiomysql", "cryptography", "greenlet"]
            }
            Feature::Database(Database::Mongodb) => &["beanie", "motor"],
            Feature::Auth(Auth::Bearer | Auth::Cookie) => {
                &["pwdlib[argon2]", "pyjwt", "python-multipart", "pydantic[email]"]
            }
            Feature::Migrations(Migrations::Alembic) => &["alembic"],
            Feature::Cache(Cache::Redis) => &["redis"],
            Feature::TaskQueue(TaskQueue::Taskiq) => &["taskiq", "taskiq-redis"],
            Feature::Observability(Observability::Sentry) => &["sentry-sdk[fastapi]"],
            _ => &[],
        },
    }
}

/// Everything one feature contributes.
#[derive(Debug, Default)]
pub struct Recipe {
    pub fragments: Vec<&'static str>,
    pub structural: Vec<PlannedMutation>,
    pub additive: Vec<PlannedMutation>,
    pub env: Vec<EnvVar>,
    pub tokens: Vec<(&'static str, &'static str)>,
    pub block: Option<ConfigBlock>,
}

/// Build the recipe for `feature` in the context of the full selection.
///
/// The selection matters where fragments depend on other slots, e.g. the
/// user model follows the storage engine.
pub fn recipe(stack: Stack, feature: Feature, selection: &FeatureSelection) -> Recipe {
    match stack {
        Stack::FastApi => fastapi_recipe(feature, selection),
    }
}

fn fastapi_recipe(feature: Feature, selection: &FeatureSelection) -> Recipe {
    use paths::{DATABASE, ENTRY_POINT, ROUTERS};

    let at = |target: &'static str, mutation: Box<dyn Mutation>| {
        PlannedMutation::new(feature, target, mutation)
    };

    match feature {
        Feature::Database(db) if db != Database::None => {
            let check = if db.is_document() {
                HealthCheck::Document
            } else {
                HealthCheck::Relational
            };
            Recipe {
                fragments: vec![if db.is_document() {
                    "db_mongo"
                } else {
                    "db_sqlmodel"
                }],
                structural: vec![at(ENTRY_POINT, Box::new(LifespanWrapper))],
                additive: vec![
                    at(ENTRY_POINT, Box::new(LifecycleHook::Database)),
                    at(ENTRY_POINT, Box::new(HealthEndpoint::new(check))),
                ],
                env: database_env(db),
                tokens: vec![("DATABASE_ENGINE", db.as_str())],
                block: Some(database_block(db)),
            }
        }

        Feature::Auth(auth) if auth != Auth::None => {
            let document = selection.database.is_document();
            let registry = if document {
                Registry::Document
            } else {
                Registry::Relational
            };
            let mut env = vec![
                EnvVar::new("SECRET_KEY", "change-me"),
                EnvVar::new("ACCESS_TOKEN_EXPIRE_MINUTES", "30"),
            ];
            if auth == Auth::Cookie {
                env.push(EnvVar::new("COOKIE_SECURE", "false"));
            }
            Recipe {
                fragments: vec![
                    match auth {
                        Auth::Cookie => "auth_cookie",
                        _ => "auth_bearer",
                    },
                    if document {
                        "user_model_mongo"
                    } else {
                        "user_model_sqlmodel"
                    },
                ],
                additive: vec![
                    at(ROUTERS, Box::new(RouterInclude::AUTH)),
                    at(ROUTERS, Box::new(RouterInclude::USERS)),
                    at(DATABASE, Box::new(ModelRegistration::user(registry))),
                ],
                env,
                block: Some(auth_block(auth)),
                ..Recipe::default()
            }
        }

        Feature::Container(Container::Docker) => Recipe {
            fragments: vec!["docker"],
            ..Recipe::default()
        },

        Feature::Migrations(Migrations::Alembic) => Recipe {
            fragments: vec!["alembic"],
            ..Recipe::default()
        },

        Feature::Cache(Cache::Redis) => Recipe {
            fragments: vec!["redis"],
            structural: vec![at(ENTRY_POINT, Box::new(LifespanWrapper))],
            additive: vec![
                at(ENTRY_POINT, Box::new(LifecycleHook::Cache)),
                at(ENTRY_POINT, Box::new(HealthEndpoint::new(HealthCheck::Cache))),
            ],
            env: vec![EnvVar::new("REDIS_URL", "redis://localhost:6379/0")],
            block: Some(ConfigBlock::new(
                BlockKind::Cache,
                "    REDIS_URL: str = \"redis://localhost:6379/0\"",
            )),
            ..Recipe::default()
        },

        Feature::TaskQueue(TaskQueue::Taskiq) => Recipe {
            fragments: vec!["taskiq"],
            structural: vec![at(ENTRY_POINT, Box::new(LifespanWrapper))],
            additive: vec![at(ENTRY_POINT, Box::new(LifecycleHook::TaskQueue))],
            env: vec![EnvVar::new(
                "TASKIQ_BROKER_URL",
                "redis://localhost:6379/1",
            )],
            block: Some(ConfigBlock::new(
                BlockKind::TaskQueue,
                "    TASKIQ_BROKER_URL: str = \"redis://localhost:6379/1\"",
            )),
            ..Recipe::default()
        },

        Feature::Observability(Observability::Sentry) => Recipe {
            fragments: vec!["sentry"],
            additive: vec![at(ENTRY_POINT, Box::new(ObservabilityInit))],
            env: vec![EnvVar::empty("SENTRY_DSN")],
            block: Some(ConfigBlock::new(
                BlockKind::Observability,
                "    SENTRY_DSN: str | None = None\n    SENTRY_TRACES_SAMPLE_RATE: float = 1.0",
            )),
            ..Recipe::default()
        },

        _ => Recipe::default(),
    }
}

/// Mutations that need the complete selection, run after every feature.
pub fn finishing(stack: Stack, selection: &FeatureSelection) -> Vec<PlannedMutation> {
    match stack {
        Stack::FastApi => fastapi_finishing(selection),
    }
}

fn fastapi_finishing(selection: &FeatureSelection) -> Vec<PlannedMutation> {
    let Some(owner) = selection.feature(FeatureSlot::Container) else {
        return Vec::new();
    };
    let at = |mutation: Box<dyn Mutation>| PlannedMutation::new(owner, paths::COMPOSE, mutation);

    let mut out = vec![at(Box::new(ComposeDatabase::new(selection.database)))];
    if selection.needs_redis() {
        out.push(at(Box::new(ComposeService::Redis)));
    }
    if selection.task_queue != TaskQueue::None {
        out.push(at(Box::new(ComposeService::Worker)));
    }
    if selection.database.has_service() {
        out.push(at(Box::new(ComposeDependency::new("app", "db"))));
    }
    if selection.needs_redis() {
        out.push(at(Box::new(ComposeDependency::new("app", "redis"))));
    }
    if selection.task_queue != TaskQueue::None {
        out.push(at(Box::new(ComposeDependency::new("worker", "redis"))));
    }
    out
}

// ── Database ─────────────────────────────────────────────────────────────────

fn database_env(db: Database) -> Vec<EnvVar> {
    let server = |port: &str, user: &str, password: &str| {
        vec![
            EnvVar::new("DB_HOST", "localhost"),
            EnvVar::new("DB_PORT", port),
            EnvVar::new("DB_USER", user),
            EnvVar::new("DB_PASSWORD", password),
            EnvVar::new("DB_NAME", "__PROJECT_NAME_SNAKE__"),
        ]
    };
    match db {
        Database::Sqlite => vec![EnvVar::new("DB_PATH", "./__PROJECT_NAME_SNAKE__.db")],
        Database::Postgresql => server("5432", "postgres", "postgres"),
        Database::Mysql => server("3306", "app", "app"),
        Database::Mongodb => vec![
            EnvVar::new("DB_HOST", "localhost"),
            EnvVar::new("DB_PORT", "27017"),
            EnvVar::new("DB_NAME", "__PROJECT_NAME_SNAKE__"),
        ],
        Database::None => Vec::new(),
    }
}

fn database_block(db: Database) -> ConfigBlock {
    let body = match db {
        Database::Sqlite => SQLITE_SETTINGS,
        Database::Postgresql => POSTGRES_SETTINGS,
        Database::Mysql => MYSQL_SETTINGS,
        Database::Mongodb => MONGO_SETTINGS,
        Database::None => return ConfigBlock::disabled(BlockKind::Database),
    };
    ConfigBlock::new(BlockKind::Database, body)
        .requires("DATABASE_ENGINE")
        .requires("PROJECT_NAME_SNAKE")
}

const SQLITE_SETTINGS: &str = r#"    DATABASE_ENGINE: str = "__DATABASE_ENGINE__"
    DB_PATH: str = "./__PROJECT_NAME_SNAKE__.db"

    @property
    def DATABASE_URI(self) -> str:
        return f"sqlite+aiosqlite:///{self.DB_PATH}""#;

const POSTGRES_SETTINGS: &str = r#"    DATABASE_ENGINE: str = "__DATABASE_ENGINE__"
    DB_HOST: str = "localhost"
    DB_PORT: int = 5432
    DB_USER: str = "postgres"
    DB_PASSWORD: str = "postgres"
    DB_NAME: str = "__PROJECT_NAME_SNAKE__"

    @property
    def DATABASE_URI(self) -> str:
        return (
            f"postgresql+asyncpg://{self.DB_USER}:{self.DB_PASSWORD}"
            f"@{self.DB_HOST}:{self.DB_PORT}/{self.DB_NAME}"
        )"#;

const MYSQL_SETTINGS: &str = r#"    DATABASE_ENGINE: str = "__DATABASE_ENGINE__"
    DB_HOST: str = "localhost"
    DB_PORT: int = 3306
    DB_USER: str = "app"
    DB_PASSWORD: str = "app"
    DB_NAME: str = "__PROJECT_NAME_SNAKE__"

    @property
    def DATABASE_URI(self) -> str:
        return (
            f"mysql+aiomysql://{self.DB_USER}:{self.DB_PASSWORD}"
            f"@{self.DB_HOST}:{self.DB_PORT}/{self.DB_NAME}"
        )"#;

const MONGO_SETTINGS: &str = r#"    DATABASE_ENGINE: str = "__DATABASE_ENGINE__"
    DB_HOST: str = "localhost"
    DB_PORT: int = 27017
    DB_NAME: str = "__PROJECT_NAME_SNAKE__"

    @property
    def DATABASE_URI(self) -> str:
        return f"mongodb://{self.DB_HOST}:{self.DB_PORT}""#;

// ── Auth ─────────────────────────────────────────────────────────────────────

fn auth_block(auth: Auth) -> ConfigBlock {
    let mut body = String::from(
        "    SECRET_KEY: str = \"change-me\"\n    ALGORITHM: str = \"HS256\"\n    ACCESS_TOKEN_EXPIRE_MINUTES: int = 30\n    USER_STORE: str = \"__DATABASE_ENGINE__\"",
    );
    if auth == Auth::Cookie {
        body.push_str("\n    COOKIE_NAME: str = \"access_token\"\n    COOKIE_SECURE: bool = False");
    }
    ConfigBlock::new(BlockKind::Auth, &body).requires("DATABASE_ENGINE")
}
