// src/watch/event_handler.rs

//! Turns filesystem notifications into cache evictions.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use notify::event::{MetadataKind, ModifyKind};
use notify::{Event, EventKind};
use tokio::sync::mpsc;
use tracing::{debug, trace};

use crate::cache::store::TokenStore;
use crate::types::KeyPolicy;

/// Which class of filesystem event caused an eviction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidationKind {
    Changed,
    Renamed,
    Deleted,
}

/// Notice sent for every cache entry a watcher evicts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invalidation {
    pub path: PathBuf,
    pub kind: InvalidationKind,
}

/// Map a `notify` event kind onto the three classes that invalidate a token.
///
/// Creation and access events never invalidate; neither do metadata changes
/// other than the write time.
pub fn classify(kind: &EventKind) -> Option<InvalidationKind> {
    match kind {
        EventKind::Modify(ModifyKind::Name(_)) => Some(InvalidationKind::Renamed),
        EventKind::Modify(ModifyKind::Metadata(MetadataKind::WriteTime | MetadataKind::Any)) => {
            Some(InvalidationKind::Changed)
        }
        EventKind::Modify(ModifyKind::Metadata(_)) => None,
        EventKind::Modify(_) => Some(InvalidationKind::Changed),
        EventKind::Remove(_) => Some(InvalidationKind::Deleted),
        _ => None,
    }
}

/// Shared eviction target for all watchers of one cache.
///
/// Watchers evict without taking the per-path computation lock; the token
/// store's generations make an in-flight computation discard its result
/// instead of re-inserting a stale token.
#[derive(Debug)]
pub struct Evictor {
    tokens: Arc<TokenStore>,
    keys: KeyPolicy,
    notifier: Option<mpsc::UnboundedSender<Invalidation>>,
}

impl Evictor {
    pub fn new(
        tokens: Arc<TokenStore>,
        keys: KeyPolicy,
        notifier: Option<mpsc::UnboundedSender<Invalidation>>,
    ) -> Self {
        Self {
            tokens,
            keys,
            notifier,
        }
    }

    pub fn keys(&self) -> KeyPolicy {
        self.keys
    }

    /// Evict the entry for `path`, returning whether one was present.
    pub fn evict(&self, path: &Path, kind: InvalidationKind) -> bool {
        let key = self.keys.key(path);
        if !self.tokens.evict(&key) {
            trace!(?path, ?kind, "no cached token to evict");
            return false;
        }

        debug!(?path, ?kind, "evicted cached token");
        if let Some(tx) = &self.notifier {
            // A closed receiver only means nobody listens any more.
            let _ = tx.send(Invalidation {
                path: path.to_path_buf(),
                kind,
            });
        }
        true
    }

    /// Apply one `notify` event. Renames evict both the old and new path.
    pub fn handle_event(&self, event: &Event) {
        let Some(kind) = classify(&event.kind) else {
            trace!(?event, "ignoring event");
            return;
        };
        for path in &event.paths {
            self.evict(path, kind);
        }
    }
}
