//! Feature selection: one variant per slot, plus the enabled-feature view
//! the composer iterates over.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::error::DomainError;
use crate::domain::value_objects::{
    Auth, Cache, Container, Database, FeatureSlot, Migrations, Observability, SlotVariant,
    TaskQueue,
};

/// A fully-resolved feature selection.
///
/// Every slot always holds a value; unset slots hold their `None` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FeatureSelection {
    pub database: Database,
    pub auth: Auth,
    pub container: Container,
    pub migrations: Migrations,
    pub cache: Cache,
    pub task_queue: TaskQueue,
    pub observability: Observability,
}

impl FeatureSelection {
    /// Empty selection: every slot is `None`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a selection from `(slot, value)` string pairs.
    ///
    /// Later pairs for the same slot win. Unknown slots and values fail with
    /// a validation error before anything else happens.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut selection = Self::new();
        for (slot, value) in pairs {
            let slot: FeatureSlot = slot.as_ref().parse()?;
            selection.set(slot, value.as_ref())?;
        }
        Ok(selection)
    }

    /// Parse `value` and store it in `slot`.
    pub fn set(&mut self, slot: FeatureSlot, value: &str) -> Result<(), DomainError> {
        match slot {
            FeatureSlot::Database => self.database = Database::parse(value)?,
            FeatureSlot::Auth => self.auth = Auth::parse(value)?,
            FeatureSlot::Container => self.container = Container::parse(value)?,
            FeatureSlot::Migrations => self.migrations = Migrations::parse(value)?,
            FeatureSlot::Cache => self.cache = Cache::parse(value)?,
            FeatureSlot::TaskQueue => self.task_queue = TaskQueue::parse(value)?,
            FeatureSlot::Observability => self.observability = Observability::parse(value)?,
        }
        Ok(())
    }

    /// Identifier stored in `slot` (`"none"` for the sentinel).
    pub fn get(&self, slot: FeatureSlot) -> &'static str {
        match slot {
            FeatureSlot::Database => self.database.as_str(),
            FeatureSlot::Auth => self.auth.as_str(),
            FeatureSlot::Container => self.container.as_str(),
            FeatureSlot::Migrations => self.migrations.as_str(),
            FeatureSlot::Cache => self.cache.as_str(),
            FeatureSlot::TaskQueue => self.task_queue.as_str(),
            FeatureSlot::Observability => self.observability.as_str(),
        }
    }

    pub fn is_enabled(&self, slot: FeatureSlot) -> bool {
        self.get(slot) != "none"
    }

    /// Enabled features in composition priority order.
    ///
    /// The order never depends on how the selection was built.
    pub fn enabled(&self) -> Vec<Feature> {
        FeatureSlot::ALL
            .iter()
            .filter_map(|slot| self.feature(*slot))
            .collect()
    }

    /// The feature occupying `slot`, if it is enabled.
    pub fn feature(&self, slot: FeatureSlot) -> Option<Feature> {
        let feature = match slot {
            FeatureSlot::Database => Feature::Database(self.database),
            FeatureSlot::Auth => Feature::Auth(self.auth),
            FeatureSlot::Container => Feature::Container(self.container),
            FeatureSlot::Migrations => Feature::Migrations(self.migrations),
            FeatureSlot::Cache => Feature::Cache(self.cache),
            FeatureSlot::TaskQueue => Feature::TaskQueue(self.task_queue),
            FeatureSlot::Observability => Feature::Observability(self.observability),
        };
        (!feature.is_none()).then_some(feature)
    }

    /// Check the cross-slot requirements.
    ///
    /// - authentication stores users, so it needs a database
    /// - migrations are generated from relational metadata
    pub fn validate(&self) -> Result<(), DomainError> {
        if self.auth != Auth::None && self.database == Database::None {
            return Err(DomainError::UnsupportedCombination {
                feature: format!("auth={}", self.auth.as_str()),
                reason: "authentication requires a database".into(),
            });
        }

        if self.migrations != Migrations::None && !self.database.is_relational() {
            return Err(DomainError::UnsupportedCombination {
                feature: format!("migrations={}", self.migrations.as_str()),
                reason: "migrations require a relational database (sqlite, postgresql, mysql)"
                    .into(),
            });
        }

        Ok(())
    }

    /// `(slot, identifier)` pairs for every enabled slot, in priority order.
    pub fn pairs(&self) -> Vec<(FeatureSlot, &'static str)> {
        self.enabled()
            .into_iter()
            .map(|f| (f.slot(), f.variant()))
            .collect()
    }

    /// Whether any enabled feature needs a Redis service.
    pub fn needs_redis(&self) -> bool {
        self.cache != Cache::None || self.task_queue != TaskQueue::None
    }
}

impl fmt::Display for FeatureSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let enabled = self.enabled();
        if enabled.is_empty() {
            return f.write_str("(no features)");
        }
        let parts: Vec<String> = enabled.iter().map(ToString::to_string).collect();
        f.write_str(&parts.join(", "))
    }
}

// ── Feature ──────────────────────────────────────────────────────────────────

/// A single enabled feature: a slot together with its chosen variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Database(Database),
    Auth(Auth),
    Container(Container),
    Migrations(Migrations),
    Cache(Cache),
    TaskQueue(TaskQueue),
    Observability(Observability),
}

impl Feature {
    pub fn slot(&self) -> FeatureSlot {
        match self {
            Self::Database(_) => FeatureSlot::Database,
            Self::Auth(_) => FeatureSlot::Auth,
            Self::Container(_) => FeatureSlot::Container,
            Self::Migrations(_) => FeatureSlot::Migrations,
            Self::Cache(_) => FeatureSlot::Cache,
            Self::TaskQueue(_) => FeatureSlot::TaskQueue,
            Self::Observability(_) => FeatureSlot::Observability,
        }
    }

    pub fn variant(&self) -> &'static str {
        match self {
            Self::Database(v) => v.as_str(),
            Self::Auth(v) => v.as_str(),
            Self::Container(v) => v.as_str(),
            Self::Migrations(v) => v.as_str(),
            Self::Cache(v) => v.as_str(),
            Self::TaskQueue(v) => v.as_str(),
            Self::Observability(v) => v.as_str(),
        }
    }

    pub fn is_none(&self) -> bool {
        self.variant() == "none"
    }

    pub fn priority(&self) -> u8 {
        self.slot().priority()
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.slot(), self.variant())
    }
}
