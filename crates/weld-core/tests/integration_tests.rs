//! Integration tests for weld-core's public API.
//!
//! Filesystem-level behaviour is covered in `weld-adapters/tests`; these
//! tests drive plans and mutations directly on strings.

use weld_core::domain::mutation::{
    self, HealthCheck, HealthEndpoint, LifecycleHook, LifespanWrapper, Mutation, RouterInclude,
};
use weld_core::domain::{DomainError, FeatureSlot, PlanMode};
use weld_core::prelude::*;

const MAIN: &str = "from fastapi import FastAPI\n\nfrom app.core.config import settings\nfrom app.routers.main import api_router\n\napp = FastAPI(\n    title=settings.PROJECT_NAME,\n    openapi_url=f\"{settings.API_V1}/openapi.json\",\n)\n\napp.include_router(api_router)\n";

const ROUTERS: &str = "from fastapi import APIRouter\n\nfrom app.core.config import settings\n\napi_router = APIRouter(prefix=settings.API_V1)\n";

fn apply_all(source: &str, mutations: &[&dyn Mutation]) -> String {
    mutations.iter().fold(source.to_string(), |src, m| {
        mutation::run(*m, &src).unwrap().unwrap_or(src)
    })
}

#[test]
fn hook_order_converges() {
    let wrapped = apply_all(MAIN, &[&LifespanWrapper]);

    let forward = apply_all(
        &wrapped,
        &[&LifecycleHook::Database, &LifecycleHook::Cache, &LifecycleHook::TaskQueue],
    );
    let backward = apply_all(
        &wrapped,
        &[&LifecycleHook::TaskQueue, &LifecycleHook::Cache, &LifecycleHook::Database],
    );
    let mixed = apply_all(
        &wrapped,
        &[&LifecycleHook::Cache, &LifecycleHook::TaskQueue, &LifecycleHook::Database],
    );

    assert_eq!(forward, backward);
    assert_eq!(forward, mixed);

    let startup = forward.find("await init_db()").unwrap();
    assert!(startup < forward.find("await init_redis()").unwrap());
    assert!(forward.find("await init_redis()").unwrap() < forward.find("await broker.startup()").unwrap());
    // Shutdown in reverse.
    assert!(forward.find("await broker.shutdown()").unwrap() < forward.find("await close_redis()").unwrap());
    assert!(forward.find("await close_redis()").unwrap() < forward.find("await close_db()").unwrap());
}

#[test]
fn health_endpoints_converge() {
    let db = HealthEndpoint::new(HealthCheck::Relational);
    let cache = HealthEndpoint::new(HealthCheck::Cache);

    let a = apply_all(MAIN, &[&db, &cache]);
    let b = apply_all(MAIN, &[&cache, &db]);

    assert_eq!(a, b);
    assert!(a.find("\"/health\"").unwrap() < a.find("\"/health/cache\"").unwrap());
}

#[test]
fn mutations_are_idempotent() {
    let once = apply_all(
        MAIN,
        &[&LifespanWrapper, &LifecycleHook::Database, &HealthEndpoint::new(HealthCheck::Document)],
    );
    let twice = apply_all(
        &once,
        &[&LifespanWrapper, &LifecycleHook::Database, &HealthEndpoint::new(HealthCheck::Document)],
    );
    assert_eq!(once, twice);
    assert_eq!(once.matches("lifespan=lifespan").count(), 1);
}

#[test]
fn additive_mutation_without_construct_fails() {
    let err = LifecycleHook::Cache.apply(MAIN).unwrap_err();
    assert!(matches!(err, DomainError::AnchorNotFound { .. }));

    let err = RouterInclude::AUTH.apply("print('no router')\n").unwrap_err();
    assert!(matches!(err, DomainError::AnchorNotFound { .. }));
}

#[test]
fn router_includes_converge() {
    let a = apply_all(ROUTERS, &[&RouterInclude::AUTH, &RouterInclude::USERS]);
    let b = apply_all(ROUTERS, &[&RouterInclude::USERS, &RouterInclude::AUTH]);
    assert_eq!(a, b);
}

#[test]
fn plan_lists_every_mutation_in_priority_order() {
    let selection = FeatureSelection::from_pairs([
        ("observability", "sentry"),
        ("container", "docker"),
        ("auth", "bearer"),
        ("database", "postgresql"),
    ])
    .unwrap();
    let plan = CompositionPlan::fresh(Stack::FastApi, "shop", selection).unwrap();

    assert_eq!(plan.mode, PlanMode::Fresh);
    let slots: Vec<FeatureSlot> = plan.features().iter().map(Feature::slot).collect();
    assert_eq!(
        slots,
        vec![
            FeatureSlot::Database,
            FeatureSlot::Auth,
            FeatureSlot::Container,
            FeatureSlot::Observability
        ]
    );

    let names: Vec<String> = plan.mutations().map(|m| m.name()).collect();
    let position = |name: &str| names.iter().position(|n| n == name).unwrap();
    assert!(position("lifespan-wrapper") < position("lifecycle-hook[database]"));
    assert!(position("router-include[auth_router]") < position("observability-init"));
    assert_eq!(names.last().map(String::as_str), Some("compose-dependency[app->db]"));
}
