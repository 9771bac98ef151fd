//! Common test utilities for integration tests.

#![allow(dead_code)]

use prep_core::action::{Action, ActionCategory, ActionDefinition, ActionRegistry, Scope};
use prep_core::clock::FixedClock;
use prep_core::preparation::{InMemoryRepository, PreparationService};
use std::sync::Arc;

/// An action accepting COLUMN and CELL scopes that does nothing.
pub struct ColumnNoop;

impl ActionDefinition for ColumnNoop {
    fn name(&self) -> &'static str {
        "column_noop"
    }

    fn category(&self) -> ActionCategory {
        ActionCategory::Strings
    }

    fn accepts_scope(&self, scope: Scope) -> bool {
        matches!(scope, Scope::Column | Scope::Cell)
    }
}

/// Registry holding [`ColumnNoop`].
pub fn test_registry() -> ActionRegistry {
    ActionRegistry::new().with(Arc::new(ColumnNoop))
}

/// `column_noop` on a column.
pub fn on_column(column: &str) -> Action {
    Action::new("column_noop")
        .with_parameter("scope", "column")
        .with_parameter("column_id", column)
}

/// Service over a fresh in-memory repository with a fixed clock.
pub fn test_service() -> (PreparationService, Arc<FixedClock>) {
    let clock = Arc::new(FixedClock::new(1_000));
    let service = PreparationService::new(Arc::new(InMemoryRepository::new()))
        .with_clock(clock.clone())
        .with_registry(test_registry())
        .with_app_version("test-1.0");
    (service, clock)
}

/// Column ids targeted by a list of actions.
pub fn targets(actions: &[Action]) -> Vec<String> {
    actions
        .iter()
        .filter_map(|a| a.parameters.column_id().map(str::to_string))
        .collect()
}
