//! Persistence of steps, contents and preparations.
//!
//! Backends implement the object-safe [`PreparationRepository`] over JSON
//! values; callers use the typed helpers of [`RepositoryExt`].

use super::model::Preparation;
use super::step::{PreparationActions, Step};
use crate::error::Result;
use parking_lot::RwLock;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

/// Kinds of stored entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    /// [`Step`].
    Step,
    /// [`PreparationActions`].
    Content,
    /// [`Preparation`].
    Preparation,
}

/// A storable entity.
pub trait Entity: Serialize + DeserializeOwned {
    /// Kind under which the entity is stored.
    const KIND: EntityKind;

    /// Storage key.
    fn entity_id(&self) -> &str;
}

impl Entity for Step {
    const KIND: EntityKind = EntityKind::Step;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Entity for PreparationActions {
    const KIND: EntityKind = EntityKind::Content;

    fn entity_id(&self) -> &str {
        self.id.as_str()
    }
}

impl Entity for Preparation {
    const KIND: EntityKind = EntityKind::Preparation;

    fn entity_id(&self) -> &str {
        &self.id
    }
}

/// Storage backend keyed by (kind, id).
pub trait PreparationRepository: Send + Sync {
    /// Store a value, replacing any previous one.
    fn put(&self, kind: EntityKind, id: &str, value: Value) -> Result<()>;

    /// Fetch a value.
    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<Value>>;

    /// Delete a value; returns whether it existed.
    fn delete(&self, kind: EntityKind, id: &str) -> Result<bool>;

    /// Every value of a kind, in id order.
    fn list(&self, kind: EntityKind) -> Result<Vec<Value>>;
}

/// Typed access to a repository.
pub trait RepositoryExt: PreparationRepository {
    /// Store an entity.
    fn add<T: Entity>(&self, entity: &T) -> Result<()> {
        self.put(T::KIND, entity.entity_id(), serde_json::to_value(entity)?)
    }

    /// Load an entity.
    fn get<T: Entity>(&self, id: &str) -> Result<Option<T>> {
        self.fetch(T::KIND, id)?
            .map(serde_json::from_value)
            .transpose()
            .map_err(Into::into)
    }

    /// Whether an entity exists.
    fn exists<T: Entity>(&self, id: &str) -> Result<bool> {
        Ok(self.fetch(T::KIND, id)?.is_some())
    }

    /// Remove an entity; returns whether it existed.
    fn remove<T: Entity>(&self, id: &str) -> Result<bool> {
        self.delete(T::KIND, id)
    }

    /// Load every entity of a type.
    fn list_all<T: Entity>(&self) -> Result<Vec<T>> {
        self.list(T::KIND)?
            .into_iter()
            .map(|v| serde_json::from_value(v).map_err(Into::into))
            .collect()
    }
}

impl<R: PreparationRepository + ?Sized> RepositoryExt for R {}

/// Repository kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    entries: RwLock<BTreeMap<(EntityKind, String), Value>>,
}

impl InMemoryRepository {
    /// Create an empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entities of a kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.entries.read().keys().filter(|(k, _)| *k == kind).count()
    }
}

impl PreparationRepository for InMemoryRepository {
    fn put(&self, kind: EntityKind, id: &str, value: Value) -> Result<()> {
        self.entries.write().insert((kind, id.to_string()), value);
        Ok(())
    }

    fn fetch(&self, kind: EntityKind, id: &str) -> Result<Option<Value>> {
        Ok(self.entries.read().get(&(kind, id.to_string())).cloned())
    }

    fn delete(&self, kind: EntityKind, id: &str) -> Result<bool> {
        Ok(self.entries.write().remove(&(kind, id.to_string())).is_some())
    }

    fn list(&self, kind: EntityKind) -> Result<Vec<Value>> {
        Ok(self
            .entries
            .read()
            .iter()
            .filter(|((k, _), _)| *k == kind)
            .map(|(_, v)| v.clone())
            .collect())
    }
}
