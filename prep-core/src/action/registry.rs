//! Name to definition mapping.

use super::definition::{ActionCategory, ActionDefinition};
use super::runtime::{ActionFactory, ActionRuntime};
use super::scope::Scope;
use super::script::Action;
use crate::error::{PrepError, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Public description of a registered action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionInfo {
    /// Unique name.
    pub name: &'static str,
    /// Category.
    pub category: ActionCategory,
    /// Scopes the action accepts.
    pub scopes: Vec<Scope>,
    /// Description.
    pub description: &'static str,
}

/// Registry of action definitions, keyed by unique name.
///
/// Built once at startup and read-only afterwards.
#[derive(Clone, Default)]
pub struct ActionRegistry {
    actions: BTreeMap<&'static str, Arc<dyn ActionDefinition>>,
}

impl ActionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition. A previous definition with the same name is replaced.
    pub fn register(&mut self, definition: Arc<dyn ActionDefinition>) {
        let name = definition.name();
        if self.actions.insert(name, definition).is_some() {
            tracing::warn!(action = name, "Replacing registered action");
        }
    }

    /// Register a definition, builder style.
    #[must_use]
    pub fn with(mut self, definition: Arc<dyn ActionDefinition>) -> Self {
        self.register(definition);
        self
    }

    /// Get a definition by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn ActionDefinition>> {
        self.actions.get(name).cloned()
    }

    /// Whether a name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.actions.keys().copied()
    }

    /// Number of registered actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Describe every registered action.
    pub fn infos(&self) -> Vec<ActionInfo> {
        self.actions
            .values()
            .map(|d| ActionInfo {
                name: d.name(),
                category: d.category(),
                scopes: Scope::ALL.into_iter().filter(|s| d.accepts_scope(*s)).collect(),
                description: d.description(),
            })
            .collect()
    }

    /// Create a runtime for one action reference.
    pub fn create(&self, action: &Action) -> Result<ActionRuntime> {
        let definition = self.get(&action.name).ok_or_else(|| PrepError::UnknownAction {
            name: action.name.clone(),
        })?;
        ActionFactory::create(definition, &action.parameters)
    }

    /// Create runtimes for an ordered action list, failing on the first
    /// invalid action.
    pub fn resolve(&self, actions: &[Action]) -> Result<Vec<ActionRuntime>> {
        actions.iter().map(|a| self.create(a)).collect()
    }
}

impl std::fmt::Debug for ActionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.actions.keys()).finish()
    }
}
