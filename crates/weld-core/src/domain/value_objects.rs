//! Domain value objects: Stack, FeatureSlot and the per-slot variant enums.
//!
//! # Design
//!
//! These are pure value types: `Copy`, equality-by-value, no identity.
//! Every slot enum implements [`SlotVariant`], which gives the composer a
//! uniform way to parse, list and display variants without a `match` per
//! slot. What a variant *contributes* to a project lives in `catalog.rs`.
//!
//! # Adding New Variants
//!
//! 1. Add the enum variant here
//! 2. Add its `as_str`, `label` and `ALL` entries here
//! 3. Describe its fragments, hooks and packages in `catalog.rs`

use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── SlotVariant ──────────────────────────────────────────────────────────────

/// Behaviour shared by every feature-slot enumeration.
///
/// The first entry of `ALL` is always the `None` sentinel.
pub trait SlotVariant: Copy + Eq + fmt::Debug + 'static {
    /// The slot this enumeration fills.
    const SLOT: FeatureSlot;

    /// Every variant, sentinel first.
    const ALL: &'static [Self];

    /// Stable identifier, used in manifests and on the command line.
    fn as_str(&self) -> &'static str;

    /// Human-readable label, used by prompts.
    fn label(&self) -> &'static str;

    /// Extra spellings accepted by the parser.
    fn aliases(&self) -> &'static [&'static str] {
        &[]
    }

    fn is_none(&self) -> bool {
        Self::ALL.first() == Some(self)
    }

    /// Identifiers of all variants, in declaration order.
    fn identifiers() -> Vec<&'static str> {
        Self::ALL.iter().map(|v| v.as_str()).collect()
    }

    /// Parse a user-supplied value.
    ///
    /// Matching is case-insensitive against the identifier, the label and
    /// the aliases. Two-variant slots also accept boolean spellings.
    fn parse(raw: &str) -> Result<Self, DomainError> {
        let wanted = raw.trim().to_ascii_lowercase();

        let found = Self::ALL.iter().copied().find(|v| {
            v.as_str() == wanted
                || v.label().to_ascii_lowercase() == wanted
                || v.aliases().contains(&wanted.as_str())
        });
        if let Some(variant) = found {
            return Ok(variant);
        }

        if Self::ALL.len() == 2 {
            match wanted.as_str() {
                "true" | "yes" | "on" => return Ok(Self::ALL[1]),
                "false" | "no" | "off" => return Ok(Self::ALL[0]),
                _ => {}
            }
        }

        Err(DomainError::InvalidFeature {
            slot: Self::SLOT.as_str().to_string(),
            value: raw.to_string(),
            allowed: Self::identifiers(),
        })
    }
}

// ── Stack ────────────────────────────────────────────────────────────────────

/// A target application stack. Each stack has its own fragment directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stack {
    FastApi,
}

impl Stack {
    pub const ALL: &'static [Stack] = &[Stack::FastApi];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::FastApi => "fastapi",
        }
    }
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stack {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fastapi" | "fast-api" => Ok(Self::FastApi),
            other => Err(DomainError::UnknownStack {
                stack: other.to_string(),
            }),
        }
    }
}

// ── FeatureSlot ──────────────────────────────────────────────────────────────

/// A named axis of project configuration.
///
/// Declaration order is the composition priority: storage before auth
/// before container before migrations before cache before task queue
/// before observability.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum FeatureSlot {
    Database,
    Auth,
    Container,
    Migrations,
    Cache,
    TaskQueue,
    Observability,
}

impl FeatureSlot {
    /// All slots in priority order.
    pub const ALL: &'static [FeatureSlot] = &[
        FeatureSlot::Database,
        FeatureSlot::Auth,
        FeatureSlot::Container,
        FeatureSlot::Migrations,
        FeatureSlot::Cache,
        FeatureSlot::TaskQueue,
        FeatureSlot::Observability,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Auth => "auth",
            Self::Container => "container",
            Self::Migrations => "migrations",
            Self::Cache => "cache",
            Self::TaskQueue => "task-queue",
            Self::Observability => "observability",
        }
    }

    /// Zero-based composition priority.
    pub const fn priority(&self) -> u8 {
        *self as u8
    }

    /// Question shown by interactive prompts.
    pub const fn prompt(&self) -> &'static str {
        match self {
            Self::Database => "Select a database",
            Self::Auth => "Select an authentication method",
            Self::Container => "Add container support?",
            Self::Migrations => "Add database migrations?",
            Self::Cache => "Add a cache?",
            Self::TaskQueue => "Add a background task queue?",
            Self::Observability => "Add error tracking?",
        }
    }

    /// Identifiers accepted for this slot.
    pub fn variants(&self) -> Vec<&'static str> {
        match self {
            Self::Database => Database::identifiers(),
            Self::Auth => Auth::identifiers(),
            Self::Container => Container::identifiers(),
            Self::Migrations => Migrations::identifiers(),
            Self::Cache => Cache::identifiers(),
            Self::TaskQueue => TaskQueue::identifiers(),
            Self::Observability => Observability::identifiers(),
        }
    }

    /// Human labels for this slot, in the same order as [`Self::variants`].
    pub fn labels(&self) -> Vec<&'static str> {
        fn labels_of<V: SlotVariant>() -> Vec<&'static str> {
            V::ALL.iter().map(|v| v.label()).collect()
        }
        match self {
            Self::Database => labels_of::<Database>(),
            Self::Auth => labels_of::<Auth>(),
            Self::Container => labels_of::<Container>(),
            Self::Migrations => labels_of::<Migrations>(),
            Self::Cache => labels_of::<Cache>(),
            Self::TaskQueue => labels_of::<TaskQueue>(),
            Self::Observability => labels_of::<Observability>(),
        }
    }
}

impl fmt::Display for FeatureSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeatureSlot {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "database" | "db" => Ok(Self::Database),
            "auth" | "authentication" => Ok(Self::Auth),
            "container" | "docker" => Ok(Self::Container),
            "migrations" | "migration" => Ok(Self::Migrations),
            "cache" => Ok(Self::Cache),
            "task-queue" | "task_queue" | "tasks" | "taskqueue" => Ok(Self::TaskQueue),
            "observability" | "monitoring" => Ok(Self::Observability),
            other => Err(DomainError::UnknownSlot {
                slot: other.to_string(),
            }),
        }
    }
}

// ── Database ─────────────────────────────────────────────────────────────────

/// Storage engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    #[default]
    None,
    Sqlite,
    Postgresql,
    Mysql,
    Mongodb,
}

impl Database {
    /// Relational engines share the SQLModel fragments.
    pub const fn is_relational(&self) -> bool {
        matches!(self, Self::Sqlite | Self::Postgresql | Self::Mysql)
    }

    pub const fn is_document(&self) -> bool {
        matches!(self, Self::Mongodb)
    }

    /// Engines that run as their own container service.
    pub const fn has_service(&self) -> bool {
        matches!(self, Self::Postgresql | Self::Mysql | Self::Mongodb)
    }
}

impl SlotVariant for Database {
    const SLOT: FeatureSlot = FeatureSlot::Database;
    const ALL: &'static [Self] = &[
        Self::None,
        Self::Sqlite,
        Self::Postgresql,
        Self::Mysql,
        Self::Mongodb,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sqlite => "sqlite",
            Self::Postgresql => "postgresql",
            Self::Mysql => "mysql",
            Self::Mongodb => "mongodb",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sqlite => "SQLite",
            Self::Postgresql => "PostgreSQL",
            Self::Mysql => "MySQL",
            Self::Mongodb => "MongoDB",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Postgresql => &["postgres", "pg"],
            Self::Mongodb => &["mongo"],
            Self::Sqlite => &["sqlite3"],
            _ => &[],
        }
    }
}

// ── Auth ─────────────────────────────────────────────────────────────────────

/// Authentication method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Auth {
    #[default]
    None,
    Bearer,
    Cookie,
}

impl SlotVariant for Auth {
    const SLOT: FeatureSlot = FeatureSlot::Auth;
    const ALL: &'static [Self] = &[Self::None, Self::Bearer, Self::Cookie];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Bearer => "bearer",
            Self::Cookie => "cookie",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Bearer => "Bearer Token (Authorization Header)",
            Self::Cookie => "Cookie-based Authentication (HTTPOnly)",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Bearer => &["jwt", "token"],
            Self::Cookie => &["cookies", "session"],
            Self::None => &[],
        }
    }
}

// ── Container ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Container {
    #[default]
    None,
    Docker,
}

impl SlotVariant for Container {
    const SLOT: FeatureSlot = FeatureSlot::Container;
    const ALL: &'static [Self] = &[Self::None, Self::Docker];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Docker => "docker",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Docker => "Docker Compose",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::Docker => &["compose", "docker-compose"],
            Self::None => &[],
        }
    }
}

// ── Migrations ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Migrations {
    #[default]
    None,
    Alembic,
}

impl SlotVariant for Migrations {
    const SLOT: FeatureSlot = FeatureSlot::Migrations;
    const ALL: &'static [Self] = &[Self::None, Self::Alembic];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Alembic => "alembic",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Alembic => "Alembic",
        }
    }
}

// ── Cache ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Cache {
    #[default]
    None,
    Redis,
}

impl SlotVariant for Cache {
    const SLOT: FeatureSlot = FeatureSlot::Cache;
    const ALL: &'static [Self] = &[Self::None, Self::Redis];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Redis => "redis",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Redis => "Redis",
        }
    }
}

// ── TaskQueue ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskQueue {
    #[default]
    None,
    Taskiq,
}

impl SlotVariant for TaskQueue {
    const SLOT: FeatureSlot = FeatureSlot::TaskQueue;
    const ALL: &'static [Self] = &[Self::None, Self::Taskiq];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Taskiq => "taskiq",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Taskiq => "TaskIQ (Redis broker)",
        }
    }
}

// ── Observability ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Observability {
    #[default]
    None,
    Sentry,
}

impl SlotVariant for Observability {
    const SLOT: FeatureSlot = FeatureSlot::Observability;
    const ALL: &'static [Self] = &[Self::None, Self::Sentry];

    fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Sentry => "sentry",
        }
    }

    fn label(&self) -> &'static str {
        match self {
            Self::None => "None",
            Self::Sentry => "Sentry",
        }
    }
}
