//! Placeholder tokens and feature-contributed configuration blocks.
//!
//! Fragments carry `__NAME__` markers. The composer computes one
//! [`TokenSet`] per run, before any file is copied, and the substitution
//! engine replaces every known marker across the staged tree. Unknown
//! markers are left alone, so Python dunders such as `__init__` survive.
//!
//! ```text
//! TokenSet
//!  ├── PROJECT_NAME            "Shop API"
//!  ├── PROJECT_NAME_SNAKE      "shop_api"
//!  ├── DATABASE_ENGINE         "postgresql"      (contributed by database)
//!  └── AUTH_BLOCK              "    # auth settings\n ..."  (ConfigBlock)
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::error::DomainError;

/// Extensions whose files are scanned for tokens.
pub const TEXT_EXTENSIONS: &[&str] = &[
    "py", "toml", "env", "md", "json", "ts", "tsx", "yaml", "yml", "ini", "cfg", "txt", "mako",
];

/// Whether `path` is subject to token substitution.
///
/// Dotenv files (`.env`, `.env.example`, ...) count as text regardless of
/// their extension.
pub fn is_text_file(path: &Path) -> bool {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default();
    if name.starts_with(".env") {
        return true;
    }
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| TEXT_EXTENSIONS.contains(&ext))
}

/// Delimited marker for a token name.
pub fn marker(name: &str) -> String {
    format!("__{name}__")
}

// ============================================================================
// TokenSet
// ============================================================================

/// Token name to replacement text.
///
/// Ordered so substitution and diagnostics are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenSet {
    values: BTreeMap<String, String>,
}

impl TokenSet {
    /// Standard project tokens derived from the project name.
    ///
    /// - `PROJECT_NAME`: as given ("Shop API")
    /// - `PROJECT_NAME_SNAKE`: "shop_api" (Python packages, database names)
    /// - `PROJECT_NAME_KEBAB`: "shop-api" (distribution names)
    /// - `PROJECT_NAME_PASCAL`: "ShopApi"
    pub fn for_project(project_name: &str) -> Self {
        let mut set = Self::default();
        set.insert("PROJECT_NAME", project_name);
        set.insert("PROJECT_NAME_SNAKE", to_snake_case(project_name));
        set.insert("PROJECT_NAME_KEBAB", to_kebab_case(project_name));
        set.insert("PROJECT_NAME_PASCAL", to_pascal_case(project_name));
        set
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Validate, render and store a configuration block.
    ///
    /// Every token the block declares must already be present; the block's
    /// own markers are resolved against the current set before it is stored
    /// under [`BlockKind::token`].
    pub fn add_block(&mut self, block: &ConfigBlock) -> Result<(), DomainError> {
        let rendered = self.render_block(block)?;
        self.insert(block.kind.token(), rendered);
        Ok(())
    }

    /// Render a block against the current set without storing it.
    pub fn render_block(&self, block: &ConfigBlock) -> Result<String, DomainError> {
        if let Some(missing) = block.required.iter().find(|t| !self.contains(t)) {
            return Err(DomainError::UnresolvedToken {
                block: block.kind.as_str().to_string(),
                token: missing.to_string(),
            });
        }
        Ok(self.substitute(&block.text).unwrap_or_else(|| block.text.clone()))
    }

    /// Replace every known marker in `text`.
    ///
    /// One left-to-right pass: replacement text is never scanned again, so
    /// a value that itself looks like a marker is written as is. Returns
    /// `None` when nothing was replaced, so callers can skip the rewrite.
    pub fn substitute(&self, text: &str) -> Option<String> {
        let mut out = String::with_capacity(text.len());
        let mut rest = text;
        let mut replaced = false;

        while let Some(at) = rest.find("__") {
            let candidate = &rest[at + 2..];
            let hit = self
                .values
                .iter()
                .filter_map(|(name, value)| {
                    let after = candidate.strip_prefix(name.as_str())?.strip_prefix("__")?;
                    Some((name.len(), value, after))
                })
                .max_by_key(|(len, _, _)| *len);

            match hit {
                Some((_, value, after)) => {
                    out.push_str(&rest[..at]);
                    out.push_str(value);
                    rest = after;
                    replaced = true;
                }
                None => {
                    out.push_str(&rest[..at + 1]);
                    rest = &rest[at + 1..];
                }
            }
        }

        if !replaced {
            return None;
        }
        out.push_str(rest);
        Some(out)
    }
}

// ============================================================================
// ConfigBlock
// ============================================================================

/// Which settings section a block fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BlockKind {
    Database,
    Auth,
    Cache,
    TaskQueue,
    Observability,
}

impl BlockKind {
    pub const ALL: &'static [BlockKind] = &[
        BlockKind::Database,
        BlockKind::Auth,
        BlockKind::Cache,
        BlockKind::TaskQueue,
        BlockKind::Observability,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Auth => "auth",
            Self::Cache => "cache",
            Self::TaskQueue => "task queue",
            Self::Observability => "observability",
        }
    }

    /// Token the settings template carries for this section.
    pub const fn token(&self) -> &'static str {
        match self {
            Self::Database => "DATABASE_BLOCK",
            Self::Auth => "AUTH_BLOCK",
            Self::Cache => "CACHE_BLOCK",
            Self::TaskQueue => "TASK_QUEUE_BLOCK",
            Self::Observability => "OBSERVABILITY_BLOCK",
        }
    }

    /// First line of a populated section.
    pub fn header(&self) -> String {
        format!("    # {} settings", self.as_str())
    }

    /// Line left in place of a disabled section.
    pub fn placeholder(&self) -> String {
        format!("    # {} settings: none", self.as_str())
    }
}

/// A feature's contribution to the settings schema.
///
/// Carries the names of the tokens its text references so a missing
/// contribution is caught before substitution instead of surfacing as a
/// literal marker in the generated project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigBlock {
    pub kind: BlockKind,
    pub text: String,
    pub required: Vec<&'static str>,
}

impl ConfigBlock {
    /// A populated section. `body` lines follow the section header.
    pub fn new(kind: BlockKind, body: &str) -> Self {
        Self {
            kind,
            text: format!("{}\n{}", kind.header(), body.trim_end_matches('\n')),
            required: Vec::new(),
        }
    }

    /// The section line for a disabled slot.
    pub fn disabled(kind: BlockKind) -> Self {
        Self {
            kind,
            text: kind.placeholder(),
            required: Vec::new(),
        }
    }

    pub fn requires(mut self, token: &'static str) -> Self {
        self.required.push(token);
        self
    }
}

// ============================================================================
// String Case Conversion Helpers
// ============================================================================

/// Convert a string to snake_case.
///
/// | Input | Output |
/// |-------|--------|
/// | "ShopApi" | "shop_api" |
/// | "shop-api" | "shop_api" |
/// | "HTTPGateway" | "http_gateway" |
pub fn to_snake_case(s: &str) -> String {
    split_words(s).join("_")
}

/// Same as `to_snake_case` but joined with `-`.
pub fn to_kebab_case(s: &str) -> String {
    split_words(s).join("-")
}

pub fn to_pascal_case(s: &str) -> String {
    split_words(s)
        .into_iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => {
                    let mut out = String::new();
                    out.extend(first.to_uppercase());
                    out.push_str(chars.as_str());
                    out
                }
                None => String::new(),
            }
        })
        .collect()
}

/// Split on separators, camelCase transitions and acronym boundaries.
fn split_words(input: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut chars = input.chars().peekable();

    while let Some(c) = chars.next() {
        if c == '_' || c == '-' || c == '.' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(current.to_lowercase());
                current.clear();
            }
            continue;
        }

        if let Some(&next) = chars.peek() {
            // "shopApi" → "shop" + "Api"
            if c.is_lowercase() && next.is_uppercase() {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }

            // "HTTPGateway" → "HTTP" + "Gateway"
            if c.is_uppercase()
                && next.is_uppercase()
                && chars.clone().nth(1).is_some_and(|n| n.is_lowercase())
            {
                current.push(c);
                words.push(current.to_lowercase());
                current.clear();
                continue;
            }
        }

        current.push(c);
    }

    if !current.is_empty() {
        words.push(current.to_lowercase());
    }

    words
}
