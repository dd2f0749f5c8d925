// src/cache/store.rs

use dashmap::DashMap;

use crate::fs::FileFingerprint;
use crate::types::PathKey;

/// A computed token together with the file metadata seen when it was computed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    /// Only recorded when metadata verification is enabled.
    pub fingerprint: Option<FileFingerprint>,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    entry: Option<CachedToken>,
}

/// Path → token map shared between computing threads and watchers.
///
/// Every slot carries a generation that is bumped on each eviction. A
/// computation records the generation before it reads the file
/// ([`TokenStore::begin`]) and its result is only stored if no eviction
/// happened in between ([`TokenStore::commit`]). Entries are never updated in
/// place: a present entry can only be evicted.
#[derive(Debug, Default)]
pub struct TokenStore {
    slots: DashMap<PathKey, Slot>,
}

impl TokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &PathKey) -> Option<CachedToken> {
        self.slots.get(key).and_then(|slot| slot.entry.clone())
    }

    pub fn contains(&self, key: &PathKey) -> bool {
        self.slots
            .get(key)
            .is_some_and(|slot| slot.entry.is_some())
    }

    /// Start a computation for `key`, returning the generation to commit against.
    pub fn begin(&self, key: &PathKey) -> u64 {
        self.slots.entry(key.clone()).or_default().generation
    }

    /// Store `token` unless `key` was evicted since [`TokenStore::begin`].
    ///
    /// Returns `false` when the result was discarded.
    pub fn commit(&self, key: &PathKey, generation: u64, token: CachedToken) -> bool {
        match self.slots.get_mut(key) {
            Some(mut slot) if slot.generation == generation && slot.entry.is_none() => {
                slot.entry = Some(token);
                true
            }
            _ => false,
        }
    }

    /// Release the slot opened by [`TokenStore::begin`] when the computation
    /// failed and nothing will be committed.
    ///
    /// Must be called while holding the path lock for `key`, so no other
    /// computation can be holding a generation for it.
    pub fn abandon(&self, key: &PathKey) {
        self.slots.remove_if(key, |_, slot| slot.entry.is_none());
    }

    /// Drop the entry for `key` and bump its generation.
    ///
    /// Returns `true` if an entry was present. Keys without a slot are left
    /// alone so unrelated events do not grow the map.
    pub fn evict(&self, key: &PathKey) -> bool {
        match self.slots.get_mut(key) {
            Some(mut slot) => {
                slot.generation += 1;
                slot.entry.take().is_some()
            }
            None => false,
        }
    }

    /// Number of present entries.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of slots, including empty ones.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::KeyPolicy;
    use std::path::Path;

    fn key(p: &str) -> PathKey {
        KeyPolicy::default().key(Path::new(p))
    }

    fn token(t: &str) -> CachedToken {
        CachedToken {
            token: t.to_string(),
            fingerprint: None,
        }
    }

    #[test]
    fn commit_then_get() {
        let store = TokenStore::new();
        let k = key("/www/a.css");
        let generation = store.begin(&k);
        assert!(store.commit(&k, generation, token("AAAAAA2")));
        assert_eq!(store.get(&k).unwrap().token, "AAAAAA2");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn eviction_during_computation_discards_result() {
        let store = TokenStore::new();
        let k = key("/www/a.css");
        let generation = store.begin(&k);

        // Nothing present yet, but the generation still moves.
        assert!(!store.evict(&k));

        assert!(!store.commit(&k, generation, token("stale")));
        assert!(!store.contains(&k));

        let generation = store.begin(&k);
        assert!(store.commit(&k, generation, token("fresh")));
        assert_eq!(store.get(&k).unwrap().token, "fresh");
    }

    #[test]
    fn present_entry_is_not_overwritten() {
        let store = TokenStore::new();
        let k = key("/www/a.css");
        let generation = store.begin(&k);
        assert!(store.commit(&k, generation, token("first")));
        assert!(!store.commit(&k, generation, token("second")));
        assert_eq!(store.get(&k).unwrap().token, "first");
    }

    #[test]
    fn abandoned_computations_leave_no_slots() {
        let store = TokenStore::new();
        for i in 0..100 {
            let k = key(&format!("/www/missing-{i}.css"));
            store.begin(&k);
            store.abandon(&k);
        }
        assert_eq!(store.slot_count(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn abandon_keeps_committed_entry() {
        let store = TokenStore::new();
        let k = key("/www/a.css");
        let generation = store.begin(&k);
        assert!(store.commit(&k, generation, token("kept")));
        store.abandon(&k);
        assert_eq!(store.get(&k).unwrap().token, "kept");
    }

    #[test]
    fn evicting_unknown_key_does_not_grow_map() {
        let store = TokenStore::new();
        assert!(!store.evict(&key("/www/never-hashed.css")));
        assert!(store.slots.is_empty());
    }
}
