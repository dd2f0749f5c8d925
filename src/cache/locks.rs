// src/cache/locks.rs

use std::sync::{Arc, Mutex};

use dashmap::DashMap;

use crate::types::PathKey;

/// Registry of per-path computation locks.
///
/// Locks are created on first use with an atomic get-or-create and are never
/// removed, so two callers asking for the same key always share one mutex.
#[derive(Debug, Default)]
pub struct LockRegistry {
    locks: DashMap<PathKey, Arc<Mutex<()>>>,
}

impl LockRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lock_for(&self, key: &PathKey) -> Arc<Mutex<()>> {
        if let Some(lock) = self.locks.get(key) {
            return Arc::clone(lock.value());
        }
        Arc::clone(self.locks.entry(key.clone()).or_default().value())
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}
