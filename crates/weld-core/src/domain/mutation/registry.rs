//! Model registry mutations (`app/core/db.py`).

use crate::domain::error::DomainError;
use crate::domain::mutation::scanner::{ensure_import, find_call, find_keyword_list, splice};
use crate::domain::mutation::{Mutation, anchor_not_found};

/// The call that receives the list of persisted models.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Registry {
    /// `create_tables(models=[...])`
    Relational,
    /// `init_beanie(..., document_models=[...])`
    Document,
}

impl Registry {
    fn callee(&self) -> &'static str {
        match self {
            Self::Relational => "create_tables",
            Self::Document => "init_beanie",
        }
    }

    fn keyword(&self) -> &'static str {
        match self {
            Self::Relational => "models",
            Self::Document => "document_models",
        }
    }
}

/// Append a model to the registry call and import it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRegistration {
    pub model: &'static str,
    pub module: &'static str,
    pub registry: Registry,
}

impl ModelRegistration {
    pub fn user(registry: Registry) -> Self {
        Self {
            model: "User",
            module: "app.models.user",
            registry,
        }
    }

    fn import(&self) -> String {
        format!("from {} import {}", self.module, self.model)
    }

    /// Identifiers currently in the registry list, if it can be found.
    fn registered<'a>(&self, source: &'a str) -> Option<Vec<&'a str>> {
        let call = find_call(source, self.registry.callee())?;
        let list = find_keyword_list(source, call, self.registry.keyword())?;
        Some(list_items(&source[list.open + 1..list.close]))
    }
}

fn list_items(inner: &str) -> Vec<&str> {
    inner
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

impl Mutation for ModelRegistration {
    fn name(&self) -> String {
        format!("model-registration[{}]", self.model)
    }

    fn marker(&self) -> String {
        self.import()
    }

    fn is_applied(&self, source: &str) -> bool {
        source.contains(&self.import())
            && self
                .registered(source)
                .is_some_and(|items| items.contains(&self.model))
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let anchor = format!(
            "the `{}({}=[...])` call",
            self.registry.callee(),
            self.registry.keyword()
        );
        let call = find_call(source, self.registry.callee())
            .ok_or_else(|| anchor_not_found(self, &anchor))?;
        let list = find_keyword_list(source, call, self.registry.keyword())
            .ok_or_else(|| anchor_not_found(self, &anchor))?;
        let mut items = list_items(&source[list.open + 1..list.close]);
        if !items.contains(&self.model) {
            items.push(self.model);
        }
        let out = splice(
            source,
            list.open,
            list.close + 1,
            &format!("[{}]", items.join(", ")),
        );

        Ok(ensure_import(&out, &self.import()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutation::run;

    const SQL_DB: &str = r#"from sqlmodel import SQLModel

from app.core.config import settings


async def create_tables(models: list[type[SQLModel]]) -> None:
    pass


async def init_db() -> None:
    await create_tables(models=[])
"#;

    const MONGO_DB: &str = r#"from beanie import init_beanie

from app.core.config import settings

db = None


async def init_db() -> None:
    await init_beanie(database=db, document_models=[])
"#;

    #[test]
    fn relational_registry_gets_model_and_import() {
        let out = ModelRegistration::user(Registry::Relational)
            .apply(SQL_DB)
            .unwrap();
        assert!(out.contains("await create_tables(models=[User])"));
        assert!(out.contains("async def create_tables(models: list[type[SQLModel]])"));
        assert!(out.contains(
            "from app.core.config import settings\nfrom app.models.user import User\n"
        ));
    }

    #[test]
    fn document_registry_holds_model_once() {
        let registration = ModelRegistration::user(Registry::Document);
        let once = run(&registration, MONGO_DB).unwrap().unwrap();
        assert_eq!(run(&registration, &once).unwrap(), None);

        assert!(once.contains("init_beanie(database=db, document_models=[User])"));
        assert_eq!(once.matches("User").count(), 2);
    }

    #[test]
    fn existing_models_are_kept() {
        let src = MONGO_DB.replace("document_models=[]", "document_models=[Item]");
        let out = ModelRegistration::user(Registry::Document)
            .apply(&src)
            .unwrap();
        assert!(out.contains("document_models=[Item, User]"));
    }

    #[test]
    fn missing_registry_call_is_reported() {
        let err = ModelRegistration::user(Registry::Document)
            .apply(SQL_DB)
            .unwrap_err();
        assert!(matches!(err, DomainError::AnchorNotFound { .. }));
    }
}
