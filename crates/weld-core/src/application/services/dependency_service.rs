//! Package resolution backed by the built-in catalog.

use crate::application::ports::DependencyResolver;
use crate::domain::{Feature, Stack, catalog};

/// Resolves packages from the static catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogDependencyResolver;

impl DependencyResolver for CatalogDependencyResolver {
    fn base_packages(&self, stack: Stack) -> Vec<String> {
        catalog::base_packages(stack)
            .iter()
            .map(|p| p.to_string())
            .collect()
    }

    fn packages(&self, stack: Stack, feature: Feature) -> Vec<String> {
        catalog::packages(stack, feature)
            .iter()
            .map(|p| p.to_string())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Database, TaskQueue};

    #[test]
    fn answers_do_not_depend_on_call_order() {
        let resolver = CatalogDependencyResolver;
        let tasks = Feature::TaskQueue(TaskQueue::Taskiq);
        let mongo = Feature::Database(Database::Mongodb);

        let first = (
            resolver.packages(Stack::FastApi, tasks),
            resolver.packages(Stack::FastApi, mongo),
        );
        let second = (
            resolver.packages(Stack::FastApi, mongo),
            resolver.packages(Stack::FastApi, tasks),
        );

        assert_eq!(first.0, second.1);
        assert_eq!(first.1, vec!["beanie", "motor"]);
    }
}
