//! Mutations of the application entry point (`app/main.py`).
//!
//! Everything here is anchored on the `app = FastAPI(...)` construction:
//! the lifespan wrapper goes before it, lifecycle hooks go inside the
//! wrapper, health endpoints go after the router registration.

use crate::domain::error::DomainError;
use crate::domain::mutation::scanner::{
    Call, ensure_import, find_assigned_call, insert_block_after, line_start, lines_in, splice,
    statements,
};
use crate::domain::mutation::{Mutation, MutationKind, anchor_not_found, malformed};

const APP_TARGET: &str = "app";
const APP_CALLEE: &str = "FastAPI";
const APP_ANCHOR: &str = "the `app = FastAPI(...)` construction";

const LIFESPAN_DEF: &str = "async def lifespan(";
const LIFESPAN_KWARG: &str = "lifespan=lifespan";
const LIFESPAN_IMPORT: &str = "from contextlib import asynccontextmanager";
const LIFESPAN_BLOCK: &str = "@asynccontextmanager\nasync def lifespan(app: FastAPI):\n    yield\n";

const ROUTER_REGISTRATION: &str = "app.include_router(";

// ── lifespan-wrapper ─────────────────────────────────────────────────────────

/// Introduce the `lifespan` async context manager and pass it to the app.
#[derive(Debug, Clone, Copy, Default)]
pub struct LifespanWrapper;

impl Mutation for LifespanWrapper {
    fn name(&self) -> String {
        "lifespan-wrapper".into()
    }

    fn kind(&self) -> MutationKind {
        MutationKind::Structural
    }

    fn marker(&self) -> String {
        LIFESPAN_DEF.into()
    }

    fn is_applied(&self, source: &str) -> bool {
        source.contains(LIFESPAN_DEF)
            && find_assigned_call(source, APP_TARGET, APP_CALLEE)
                .is_some_and(|(_, call)| call.args(source).contains("lifespan="))
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let (_, call) = find_assigned_call(source, APP_TARGET, APP_CALLEE)
            .ok_or_else(|| anchor_not_found(self, APP_ANCHOR))?;

        match (
            source.contains(LIFESPAN_DEF),
            call.args(source).contains("lifespan="),
        ) {
            (true, false) => {
                return Err(malformed(
                    self,
                    "`lifespan` is defined but not passed to the application",
                ));
            }
            (false, true) => {
                return Err(malformed(
                    self,
                    "the application is given a `lifespan` that is never defined",
                ));
            }
            _ => {}
        }

        let with_kwarg = add_keyword(source, call, LIFESPAN_KWARG);
        let (stmt, _) = find_assigned_call(&with_kwarg, APP_TARGET, APP_CALLEE)
            .ok_or_else(|| anchor_not_found(self, APP_ANCHOR))?;
        let with_block = splice(
            &with_kwarg,
            stmt.start,
            stmt.start,
            &format!("\n{LIFESPAN_BLOCK}\n\n"),
        );

        Ok(ensure_import(&with_block, LIFESPAN_IMPORT))
    }
}

/// Append `keyword` to a call's arguments, following its layout.
fn add_keyword(src: &str, call: Call, keyword: &str) -> String {
    if call.args(src).trim().is_empty() {
        return splice(src, call.open + 1, call.close, keyword);
    }

    let last_end = src[..call.close].trim_end().len();
    let trailing_comma = src[..last_end].ends_with(',');
    let close_line = line_start(src, call.close);

    if close_line > last_end {
        // Closing bracket on its own line: add an argument line above it.
        let out = splice(src, close_line, close_line, &format!("    {keyword},\n"));
        let comma = if trailing_comma { "" } else { "," };
        splice(&out, last_end, last_end, comma)
    } else {
        let sep = if trailing_comma { " " } else { ", " };
        splice(src, last_end, last_end, &format!("{sep}{keyword}"))
    }
}

// ── lifecycle-hook ───────────────────────────────────────────────────────────

/// A start/stop pair inside the lifespan wrapper.
///
/// Startup calls run in declaration order, shutdown calls in reverse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleHook {
    Database,
    Cache,
    TaskQueue,
}

impl LifecycleHook {
    pub const ALL: &'static [LifecycleHook] = &[Self::Database, Self::Cache, Self::TaskQueue];

    fn rank(&self) -> u8 {
        *self as u8
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Cache => "cache",
            Self::TaskQueue => "task-queue",
        }
    }

    pub fn startup(&self) -> &'static str {
        match self {
            Self::Database => "await init_db()",
            Self::Cache => "await init_redis()",
            Self::TaskQueue => "await broker.startup()",
        }
    }

    pub fn shutdown(&self) -> &'static str {
        match self {
            Self::Database => "await close_db()",
            Self::Cache => "await close_redis()",
            Self::TaskQueue => "await broker.shutdown()",
        }
    }

    pub fn import(&self) -> &'static str {
        match self {
            Self::Database => "from app.core.db import close_db, init_db",
            Self::Cache => "from app.core.redis import close_redis, init_redis",
            Self::TaskQueue => "from app.core.tasks import broker",
        }
    }
}

impl Mutation for LifecycleHook {
    fn name(&self) -> String {
        format!("lifecycle-hook[{}]", self.label())
    }

    fn marker(&self) -> String {
        self.startup().into()
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let stmt = statements(source)
            .into_iter()
            .find(|s| s.text(source).contains(LIFESPAN_DEF))
            .ok_or_else(|| anchor_not_found(self, "the `lifespan` context manager"))?;

        let lines = lines_in(source, stmt.start, stmt.end);
        let def = lines
            .iter()
            .position(|(_, l)| l.trim_start().starts_with(LIFESPAN_DEF))
            .ok_or_else(|| anchor_not_found(self, "the `lifespan` signature"))?;
        let yield_at = lines
            .iter()
            .position(|(_, l)| l.trim() == "yield")
            .ok_or_else(|| malformed(self, "`lifespan` has no bare `yield`"))?;
        let line_after = |idx: usize| lines[idx].0 + lines[idx].1.len();

        let startup_anchor = (def + 1..yield_at)
            .rev()
            .find(|&i| {
                Self::ALL
                    .iter()
                    .any(|h| h.rank() < self.rank() && lines[i].1.trim() == h.startup())
            })
            .unwrap_or(def);
        let shutdown_anchor = (yield_at + 1..lines.len())
            .rev()
            .find(|&i| {
                Self::ALL
                    .iter()
                    .any(|h| h.rank() > self.rank() && lines[i].1.trim() == h.shutdown())
            })
            .unwrap_or(yield_at);

        // Shutdown sits below startup, so splice it first.
        let shutdown_at = line_after(shutdown_anchor);
        let startup_at = line_after(startup_anchor);
        let out = splice(
            source,
            shutdown_at,
            shutdown_at,
            &format!("    {}\n", self.shutdown()),
        );
        let out = splice(&out, startup_at, startup_at, &format!("    {}\n", self.startup()));

        Ok(ensure_import(&out, self.import()))
    }
}

// ── health-endpoint ──────────────────────────────────────────────────────────

/// Reachability probe for a storage feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HealthCheck {
    /// `/health` through a session dependency and `SELECT 1`.
    Relational,
    /// `/health` through an admin `ping`.
    Document,
    /// `/health/cache` through the cache client.
    Cache,
}

impl HealthCheck {
    pub const ALL: &'static [HealthCheck] = &[Self::Relational, Self::Document, Self::Cache];

    fn rank(&self) -> u8 {
        match self {
            Self::Relational | Self::Document => 0,
            Self::Cache => 1,
        }
    }

    pub fn route(&self) -> &'static str {
        match self {
            Self::Relational | Self::Document => "/health",
            Self::Cache => "/health/cache",
        }
    }

    fn marker(&self) -> String {
        format!("@app.get(\"{}\",", self.route())
    }

    fn imports(&self) -> &'static [&'static str] {
        match self {
            Self::Relational => &[
                "from fastapi import Depends, HTTPException",
                "from sqlalchemy import text",
                "from sqlalchemy.ext.asyncio import AsyncSession",
                "from app.core.db import get_session",
            ],
            Self::Document => &["from fastapi import HTTPException", "from app.core import db"],
            Self::Cache => &[
                "from fastapi import HTTPException",
                "from app.core.redis import ping_redis",
            ],
        }
    }

    fn block(&self) -> &'static str {
        match self {
            Self::Relational => RELATIONAL_HEALTH,
            Self::Document => DOCUMENT_HEALTH,
            Self::Cache => CACHE_HEALTH,
        }
    }
}

const RELATIONAL_HEALTH: &str = r#"@app.get("/health", tags=["Health"])
async def healthcheck(session: AsyncSession = Depends(get_session)):
    try:
        await session.execute(text("SELECT 1"))
    except Exception as exc:
        raise HTTPException(status_code=503, detail=f"Database not reachable: {exc}")
    return {"status": "ok", "database": "reachable"}
"#;

const DOCUMENT_HEALTH: &str = r#"@app.get("/health", tags=["Health"])
async def healthcheck():
    try:
        await db.client.admin.command("ping")
    except Exception as exc:
        raise HTTPException(status_code=503, detail=f"Database not reachable: {exc}")
    return {"status": "ok", "database": "reachable"}
"#;

const CACHE_HEALTH: &str = r#"@app.get("/health/cache", tags=["Health"])
async def cache_healthcheck():
    try:
        await ping_redis()
    except Exception as exc:
        raise HTTPException(status_code=503, detail=f"Cache not reachable: {exc}")
    return {"status": "ok", "cache": "reachable"}
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HealthEndpoint {
    pub check: HealthCheck,
}

impl HealthEndpoint {
    pub fn new(check: HealthCheck) -> Self {
        Self { check }
    }
}

impl Mutation for HealthEndpoint {
    fn name(&self) -> String {
        format!("health-endpoint[{}]", self.check.route())
    }

    fn marker(&self) -> String {
        self.check.marker()
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let stmts = statements(source);
        let registration = stmts
            .iter()
            .rev()
            .find(|s| s.head(source).starts_with(ROUTER_REGISTRATION))
            .ok_or_else(|| anchor_not_found(self, "the `app.include_router(...)` registration"))?;

        let anchor = stmts
            .iter()
            .filter(|s| {
                HealthCheck::ALL.iter().any(|c| {
                    c.rank() < self.check.rank() && s.head(source).starts_with(&c.marker())
                })
            })
            .next_back()
            .unwrap_or(registration);

        let out = insert_block_after(source, anchor.end, self.check.block());
        Ok(self
            .check
            .imports()
            .iter()
            .fold(out, |acc, line| ensure_import(&acc, line)))
    }
}

// ── observability-init ───────────────────────────────────────────────────────

/// Call `init_observability(app)` directly after the app is constructed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObservabilityInit;

const OBSERVABILITY_CALL: &str = "init_observability(app)";
const OBSERVABILITY_IMPORT: &str = "from app.core.observability import init_observability";

impl Mutation for ObservabilityInit {
    fn name(&self) -> String {
        "observability-init".into()
    }

    fn marker(&self) -> String {
        OBSERVABILITY_CALL.into()
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let (stmt, _) = find_assigned_call(source, APP_TARGET, APP_CALLEE)
            .ok_or_else(|| anchor_not_found(self, APP_ANCHOR))?;
        let out = splice(
            source,
            stmt.end,
            stmt.end,
            &format!("{OBSERVABILITY_CALL}\n"),
        );
        Ok(ensure_import(&out, OBSERVABILITY_IMPORT))
    }
}
