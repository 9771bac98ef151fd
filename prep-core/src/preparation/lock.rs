//! Named exclusive locks for read-modify-write of head references.

use parking_lot::{Condvar, Mutex};
use std::collections::HashSet;

/// Registry of named, per-entity exclusive locks.
///
/// A name is held by at most one [`EntityLock`] at a time; other callers
/// block until the guard is dropped.
#[derive(Debug, Default)]
pub struct LockRegistry {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

impl LockRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock named `key`, blocking while another guard holds it.
    pub fn lock(&self, key: impl Into<String>) -> EntityLock<'_> {
        let key = key.into();
        let mut held = self.held.lock();
        while held.contains(&key) {
            self.released.wait(&mut held);
        }
        held.insert(key.clone());
        tracing::trace!(lock = %key, "Acquired lock");
        EntityLock {
            registry: self,
            key,
        }
    }

    /// Acquire the lock of a preparation.
    pub fn lock_preparation(&self, preparation_id: &str) -> EntityLock<'_> {
        self.lock(format!("preparation#{preparation_id}"))
    }

    /// Whether a lock is currently held.
    pub fn is_locked(&self, key: &str) -> bool {
        self.held.lock().contains(key)
    }
}

/// Guard of a named lock; releases on drop.
#[derive(Debug)]
pub struct EntityLock<'a> {
    registry: &'a LockRegistry,
    key: String,
}

impl EntityLock<'_> {
    /// Name of the held lock.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl Drop for EntityLock<'_> {
    fn drop(&mut self) {
        self.registry.held.lock().remove(&self.key);
        self.registry.released.notify_all();
        tracing::trace!(lock = %self.key, "Released lock");
    }
}
