//! Container orchestration mutations (`docker-compose.yaml`).
//!
//! The compose file is edited line by line with a fixed layout: services at
//! indent 2, service keys at indent 4, `depends_on` entries at indent 6.

use crate::domain::error::DomainError;
use crate::domain::mutation::{Mutation, MutationKind, anchor_not_found, malformed};
use crate::domain::value_objects::Database;

const PLACEHOLDER: &str = "# DATABASE_SERVICE";
const DATABASE_SERVICE: &str = "db";
const DEPENDS_ON: &str = "    depends_on:";

// ── Line helpers ─────────────────────────────────────────────────────────────

fn split(source: &str) -> Vec<String> {
    source.lines().map(str::to_string).collect()
}

fn join(lines: &[String]) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

fn indent(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// End (exclusive) of the block opened at `header`, trailing blanks excluded.
fn block_end(lines: &[String], header: usize, header_indent: usize) -> usize {
    let mut end = (header + 1..lines.len())
        .find(|&i| !is_blank(&lines[i]) && indent(&lines[i]) <= header_indent)
        .unwrap_or(lines.len());
    while end > header + 1 && is_blank(&lines[end - 1]) {
        end -= 1;
    }
    end
}

fn services_header(lines: &[String]) -> Option<usize> {
    lines.iter().position(|l| l.trim_end() == "services:")
}

/// `(header, end)` of a service block.
fn service(lines: &[String], name: &str) -> Option<(usize, usize)> {
    let services = services_header(lines)?;
    let section_end = block_end(lines, services, 0);
    let header = format!("  {name}:");
    let at = (services + 1..section_end).find(|&i| lines[i].trim_end() == header)?;
    Some((at, block_end(lines, at, 2)))
}

/// `(header, end)` of a service's `depends_on` block.
fn depends_on(lines: &[String], (start, end): (usize, usize)) -> Option<(usize, usize)> {
    let at = (start + 1..end).find(|&i| lines[i].trim_end() == DEPENDS_ON)?;
    Some((at, block_end(lines, at, 4).min(end)))
}

/// Whether `from`'s dependency block already names `to`.
fn has_dependency(lines: &[String], from: &str, to: &str) -> bool {
    service(lines, from)
        .and_then(|block| depends_on(lines, block))
        .is_some_and(|(at, end)| lines[at + 1..end].iter().any(|l| l.contains(to)))
}

fn append_service(lines: &mut Vec<String>, name: &str, body: &str) -> Option<()> {
    let services = services_header(lines)?;
    let end = block_end(lines, services, 0);
    let mut block = vec![String::new(), format!("  {name}:")];
    block.extend(body.lines().map(str::to_string));
    lines.splice(end..end, block);
    Some(())
}

fn remove_service(lines: &mut Vec<String>, name: &str) {
    let Some((at, end)) = service(lines, name) else {
        return;
    };
    lines.drain(at..end);
    let trailing = lines.get(at).is_none_or(|l| is_blank(l));
    if at > 0 && is_blank(&lines[at - 1]) && trailing {
        lines.remove(at - 1);
    }
}

/// Drop every `depends_on` entry naming `target`, and any block left empty.
fn remove_dependency(lines: &mut Vec<String>, target: &str) {
    let entry = format!("      {target}:");
    let headers: Vec<usize> = lines
        .iter()
        .enumerate()
        .filter(|(_, l)| l.trim_end() == DEPENDS_ON)
        .map(|(i, _)| i)
        .collect();

    for &header in headers.iter().rev() {
        let end = block_end(lines, header, 4);
        let Some(at) = (header + 1..end).find(|&i| lines[i].trim_end() == entry) else {
            continue;
        };
        let entry_end = block_end(lines, at, 6).min(end);
        lines.drain(at..entry_end);

        let remaining = block_end(lines, header, 4);
        if (header + 1..remaining).all(|i| is_blank(&lines[i])) {
            lines.remove(header);
        }
    }
}

// ── compose-database ─────────────────────────────────────────────────────────

/// Fill, append or remove the database service for the chosen engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeDatabase {
    pub database: Database,
}

impl ComposeDatabase {
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    fn body(&self) -> Option<&'static str> {
        match self.database {
            Database::Postgresql => Some(POSTGRES_SERVICE),
            Database::Mysql => Some(MYSQL_SERVICE),
            Database::Mongodb => Some(MONGO_SERVICE),
            Database::Sqlite | Database::None => None,
        }
    }
}

const POSTGRES_SERVICE: &str = r#"    image: postgres:16-alpine
    environment:
      POSTGRES_USER: ${DB_USER}
      POSTGRES_PASSWORD: ${DB_PASSWORD}
      POSTGRES_DB: ${DB_NAME}
    ports:
      - "5432:5432"
    healthcheck:
      test: ["CMD-SHELL", "pg_isready -U ${DB_USER} -d ${DB_NAME}"]
      interval: 5s
      timeout: 5s
      retries: 5"#;

const MYSQL_SERVICE: &str = r#"    image: mysql:8.4
    environment:
      MYSQL_DATABASE: ${DB_NAME}
      MYSQL_USER: ${DB_USER}
      MYSQL_PASSWORD: ${DB_PASSWORD}
      MYSQL_ROOT_PASSWORD: ${DB_PASSWORD}
    ports:
      - "3306:3306"
    healthcheck:
      test: ["CMD", "mysqladmin", "ping", "-h", "localhost"]
      interval: 5s
      timeout: 5s
      retries: 10"#;

const MONGO_SERVICE: &str = r#"    image: mongo:7
    ports:
      - "27017:27017"
    healthcheck:
      test: ["CMD", "mongosh", "--quiet", "--eval", "db.adminCommand('ping')"]
      interval: 5s
      timeout: 5s
      retries: 5"#;

impl Mutation for ComposeDatabase {
    fn name(&self) -> String {
        "compose-database".into()
    }

    fn kind(&self) -> MutationKind {
        MutationKind::Structural
    }

    fn marker(&self) -> String {
        match self.body().and_then(|b| b.lines().next()) {
            Some(image) => image.trim().to_string(),
            None => format!("no `{PLACEHOLDER}` and no `{DATABASE_SERVICE}` dependency"),
        }
    }

    fn is_applied(&self, source: &str) -> bool {
        let lines = split(source);
        let placeholder = lines.iter().any(|l| l.trim() == PLACEHOLDER);
        if placeholder {
            return false;
        }
        match self.body() {
            Some(_) => service(&lines, DATABASE_SERVICE).is_some(),
            None => {
                let entry = format!("      {DATABASE_SERVICE}:");
                !lines.iter().any(|l| l.trim_end() == entry)
            }
        }
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let mut lines = split(source);
        if services_header(&lines).is_none() {
            return Err(anchor_not_found(self, "the `services:` section"));
        }
        let placeholder = lines.iter().position(|l| l.trim() == PLACEHOLDER);

        match (self.body(), placeholder) {
            (Some(body), Some(at)) => {
                let owner = at.checked_sub(1).map(|i| lines[i].trim_end());
                if owner != Some("  db:") {
                    return Err(malformed(
                        self,
                        format!("`{PLACEHOLDER}` is not directly under the `db` service"),
                    ));
                }
                lines.splice(at..=at, body.lines().map(str::to_string));
            }
            (Some(body), None) => {
                if service(&lines, DATABASE_SERVICE).is_none() {
                    append_service(&mut lines, DATABASE_SERVICE, body)
                        .ok_or_else(|| anchor_not_found(self, "the `services:` section"))?;
                }
            }
            (None, _) => {
                remove_service(&mut lines, DATABASE_SERVICE);
                remove_dependency(&mut lines, DATABASE_SERVICE);
            }
        }

        Ok(join(&lines))
    }
}

// ── compose-service ──────────────────────────────────────────────────────────

/// An auxiliary service appended when missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComposeService {
    Redis,
    Worker,
}

impl ComposeService {
    pub fn service_name(&self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::Worker => "worker",
        }
    }

    fn body(&self) -> &'static str {
        match self {
            Self::Redis => REDIS_SERVICE,
            Self::Worker => WORKER_SERVICE,
        }
    }
}

const REDIS_SERVICE: &str = r#"    image: redis:7-alpine
    ports:
      - "6379:6379"
    healthcheck:
      test: ["CMD", "redis-cli", "ping"]
      interval: 5s
      timeout: 3s
      retries: 5"#;

const WORKER_SERVICE: &str = r#"    build: .
    command: uv run taskiq worker app.core.tasks:broker
    env_file:
      - .env"#;

impl Mutation for ComposeService {
    fn name(&self) -> String {
        format!("compose-service[{}]", self.service_name())
    }

    fn marker(&self) -> String {
        format!("  {}:", self.service_name())
    }

    fn is_applied(&self, source: &str) -> bool {
        service(&split(source), self.service_name()).is_some()
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let mut lines = split(source);
        append_service(&mut lines, self.service_name(), self.body())
            .ok_or_else(|| anchor_not_found(self, "the `services:` section"))?;
        Ok(join(&lines))
    }
}

// ── compose-dependency ───────────────────────────────────────────────────────

/// A health-checked `depends_on` entry from one service to another.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposeDependency {
    pub from: &'static str,
    pub to: &'static str,
}

impl ComposeDependency {
    pub fn new(from: &'static str, to: &'static str) -> Self {
        Self { from, to }
    }
}

impl Mutation for ComposeDependency {
    fn name(&self) -> String {
        format!("compose-dependency[{}->{}]", self.from, self.to)
    }

    fn marker(&self) -> String {
        format!("      {}:", self.to)
    }

    fn is_applied(&self, source: &str) -> bool {
        has_dependency(&split(source), self.from, self.to)
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let mut lines = split(source);
        let block = service(&lines, self.from)
            .ok_or_else(|| anchor_not_found(self, &format!("the `{}` service", self.from)))?;

        let entry = [
            format!("      {}:", self.to),
            "        condition: service_healthy".to_string(),
        ];

        match depends_on(&lines, block) {
            Some((at, end)) => {
                if lines[at + 1..end]
                    .iter()
                    .any(|l| l.trim_start().starts_with("- "))
                {
                    return Err(malformed(
                        self,
                        format!("`{}` lists its dependencies without conditions", self.from),
                    ));
                }
                lines.splice(end..end, entry);
            }
            None => {
                let end = block.1;
                let mut added = vec![DEPENDS_ON.to_string()];
                added.extend(entry);
                lines.splice(end..end, added);
            }
        }

        Ok(join(&lines))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutation::run;

    const COMPOSE: &str = r#"services:
  app:
    build: .
    ports:
      - "8000:8000"
    env_file:
      - .env
    depends_on:
      db:
        condition: service_healthy

  db:
    # DATABASE_SERVICE
"#;

    fn apply_all(source: &str, mutations: &[&dyn Mutation]) -> String {
        mutations.iter().fold(source.to_string(), |acc, m| {
            run(*m, &acc).unwrap().unwrap_or(acc)
        })
    }

    #[test]
    fn placeholder_becomes_engine_service() {
        let out = ComposeDatabase::new(Database::Postgresql)
            .apply(COMPOSE)
            .unwrap();
        assert!(out.contains("  db:\n    image: postgres:16-alpine\n"));
        assert!(!out.contains(PLACEHOLDER));
        assert!(ComposeDatabase::new(Database::Postgresql).is_applied(&out));
    }

    #[test]
    fn embedded_database_removes_service_and_dependency() {
        let out = ComposeDatabase::new(Database::Sqlite).apply(COMPOSE).unwrap();
        assert_eq!(
            out,
            "services:\n  app:\n    build: .\n    ports:\n      - \"8000:8000\"\n    env_file:\n      - .env\n"
        );
        assert!(ComposeDatabase::new(Database::Sqlite).is_applied(&out));
    }

    #[test]
    fn server_database_is_appended_when_placeholder_is_gone() {
        let stripped = ComposeDatabase::new(Database::None).apply(COMPOSE).unwrap();
        let out = apply_all(
            &stripped,
            &[
                &ComposeDatabase::new(Database::Mongodb),
                &ComposeDependency::new("app", "db"),
            ],
        );
        assert!(out.contains("\n\n  db:\n    image: mongo:7\n"));
        assert!(out.contains("    depends_on:\n      db:\n        condition: service_healthy\n"));
    }

    #[test]
    fn full_stack_wiring_appears_exactly_once() {
        let mutations: [&dyn Mutation; 6] = [
            &ComposeDatabase::new(Database::Postgresql),
            &ComposeService::Redis,
            &ComposeService::Worker,
            &ComposeDependency::new("app", "db"),
            &ComposeDependency::new("app", "redis"),
            &ComposeDependency::new("worker", "redis"),
        ];
        let once = apply_all(COMPOSE, &mutations);
        let twice = apply_all(&once, &mutations);
        assert_eq!(once, twice);

        assert_eq!(once.matches("\n  db:\n").count(), 1);
        assert_eq!(once.matches("\n  redis:\n").count(), 1);
        assert_eq!(once.matches("\n  worker:\n").count(), 1);
        assert_eq!(once.matches("      redis:\n").count(), 2);

        let app = service(&split(&once), "app").unwrap();
        let worker = service(&split(&once), "worker").unwrap();
        let lines = split(&once);
        assert!(lines[app.0..app.1].iter().any(|l| l == "      redis:"));
        assert!(lines[worker.0..worker.1].iter().any(|l| l == "      redis:"));
    }

    #[test]
    fn dependency_on_missing_service_is_reported() {
        let err = ComposeDependency::new("worker", "redis")
            .apply(COMPOSE)
            .unwrap_err();
        assert!(matches!(err, DomainError::AnchorNotFound { .. }));
    }

    #[test]
    fn list_style_dependencies_are_malformed() {
        let src = "services:\n  app:\n    depends_on:\n      - db\n";
        let err = ComposeDependency::new("app", "redis").apply(src).unwrap_err();
        assert!(matches!(err, DomainError::MalformedExistingContent { .. }));
    }
}
