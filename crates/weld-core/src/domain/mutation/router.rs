//! Router aggregator mutations (`app/routers/main.py`).

use crate::domain::error::DomainError;
use crate::domain::mutation::scanner::{ensure_import, find_assigned_call, splice, statements};
use crate::domain::mutation::{Mutation, anchor_not_found};

/// Register a feature router on the aggregated `api_router`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterInclude {
    pub alias: &'static str,
    pub module: &'static str,
}

impl RouterInclude {
    pub const AUTH: RouterInclude = RouterInclude {
        alias: "auth_router",
        module: "app.routers.auth.router",
    };
    pub const USERS: RouterInclude = RouterInclude {
        alias: "users_router",
        module: "app.routers.users.router",
    };

    /// Known includes in registration order.
    pub const ALL: &'static [RouterInclude] = &[Self::AUTH, Self::USERS];

    fn rank(&self) -> usize {
        Self::ALL
            .iter()
            .position(|r| r == self)
            .unwrap_or(Self::ALL.len())
    }

    fn statement(&self) -> String {
        format!("api_router.include_router({})", self.alias)
    }

    fn import(&self) -> String {
        format!("from {} import router as {}", self.module, self.alias)
    }
}

impl Mutation for RouterInclude {
    fn name(&self) -> String {
        format!("router-include[{}]", self.alias)
    }

    fn marker(&self) -> String {
        self.statement()
    }

    fn apply(&self, source: &str) -> Result<String, DomainError> {
        let (anchor, _) = find_assigned_call(source, "api_router", "APIRouter")
            .ok_or_else(|| anchor_not_found(self, "the `api_router = APIRouter(...)` construction"))?;

        let after = statements(source)
            .into_iter()
            .filter(|s| {
                Self::ALL
                    .iter()
                    .any(|r| r.rank() < self.rank() && s.text(source).trim_end() == r.statement())
            })
            .next_back()
            .map_or(anchor.end, |s| s.end);

        let out = splice(source, after, after, &format!("{}\n", self.statement()));
        Ok(ensure_import(&out, &self.import()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::mutation::run;

    const ROUTERS: &str = "from fastapi import APIRouter\n\nfrom app.core.config import settings\n\napi_router = APIRouter(prefix=settings.API_V1)\n";

    #[test]
    fn includes_follow_anchor_in_registration_order() {
        let a = RouterInclude::USERS.apply(ROUTERS).unwrap();
        let a = RouterInclude::AUTH.apply(&a).unwrap();

        let b = RouterInclude::AUTH.apply(ROUTERS).unwrap();
        let b = RouterInclude::USERS.apply(&b).unwrap();

        assert_eq!(a, b);
        assert_eq!(
            a,
            "from fastapi import APIRouter\n\n\
             from app.core.config import settings\n\
             from app.routers.auth.router import router as auth_router\n\
             from app.routers.users.router import router as users_router\n\n\
             api_router = APIRouter(prefix=settings.API_V1)\n\
             api_router.include_router(auth_router)\n\
             api_router.include_router(users_router)\n"
        );
    }

    #[test]
    fn include_is_idempotent() {
        let once = RouterInclude::AUTH.apply(ROUTERS).unwrap();
        assert_eq!(run(&RouterInclude::AUTH, &once).unwrap(), None);
    }

    #[test]
    fn missing_aggregator_is_reported() {
        let err = RouterInclude::AUTH
            .apply("from fastapi import APIRouter\n")
            .unwrap_err();
        assert!(matches!(err, DomainError::AnchorNotFound { .. }));
    }
}
