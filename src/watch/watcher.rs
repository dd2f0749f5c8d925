// src/watch/watcher.rs

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::errors::Result;
use crate::types::PathKey;
use crate::watch::event_handler::Evictor;

/// How directory watchers are realised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WatchMode {
    /// Subscribe to OS change notifications through `notify`.
    #[default]
    Notify,
    /// Track directories without subscribing; entries are only evicted
    /// through [`crate::cache::HashCache::invalidate`]. Used with in-memory
    /// filesystems that the OS cannot watch.
    Manual,
}

/// Handle for one directory watcher.
///
/// This exists mainly so the underlying `RecommendedWatcher` is kept alive for
/// as long as needed. Dropping this handle will stop watching the directory.
pub struct WatcherHandle {
    dir: PathBuf,
    _inner: Option<RecommendedWatcher>,
}

impl WatcherHandle {
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle")
            .field("dir", &self.dir)
            .field("live", &self._inner.is_some())
            .finish()
    }
}

/// Spawn a non-recursive watcher on `dir` that feeds change, rename and
/// delete events into `evictor`.
///
/// `notify` invokes the callback on its own thread, outside any caller of the
/// cache.
pub fn spawn_dir_watcher(dir: &Path, evictor: Arc<Evictor>) -> Result<WatcherHandle> {
    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                debug!(?event, "received notify event");
                evictor.handle_event(&event);
            }
            Err(err) => {
                // Dropped or failed notifications leave entries stale; there is
                // nothing to recover here beyond reporting it.
                warn!("file watch error: {err}");
            }
        },
        Config::default(),
    )?;

    watcher.watch(dir, RecursiveMode::NonRecursive)?;

    info!("invalidation watcher started on {:?}", dir);

    Ok(WatcherHandle {
        dir: dir.to_path_buf(),
        _inner: Some(watcher),
    })
}

/// One watcher per directory, created on demand and kept for the life of
/// the registry.
#[derive(Debug)]
pub struct WatcherRegistry {
    mode: WatchMode,
    evictor: Arc<Evictor>,
    watchers: DashMap<PathKey, WatcherHandle>,
}

impl WatcherRegistry {
    pub fn new(mode: WatchMode, evictor: Arc<Evictor>) -> Self {
        Self {
            mode,
            evictor,
            watchers: DashMap::new(),
        }
    }

    pub fn evictor(&self) -> &Arc<Evictor> {
        &self.evictor
    }

    /// Make sure `dir` has a watcher, returning `true` if one was created.
    ///
    /// The watcher is built outside the map lock. If another thread registers
    /// the same directory meanwhile, the extra watcher is dropped.
    pub fn ensure_watching(&self, dir: &Path) -> Result<bool> {
        let key = self.evictor.keys().key(dir);
        if self.watchers.contains_key(&key) {
            return Ok(false);
        }

        let handle = match self.mode {
            WatchMode::Notify => spawn_dir_watcher(dir, Arc::clone(&self.evictor))?,
            WatchMode::Manual => WatcherHandle {
                dir: dir.to_path_buf(),
                _inner: None,
            },
        };

        match self.watchers.entry(key) {
            Entry::Occupied(_) => {
                debug!(?dir, "directory already watched; dropping duplicate watcher");
                Ok(false)
            }
            Entry::Vacant(slot) => {
                slot.insert(handle);
                Ok(true)
            }
        }
    }

    pub fn is_watching(&self, dir: &Path) -> bool {
        self.watchers.contains_key(&self.evictor.keys().key(dir))
    }

    /// Watched directories, sorted.
    pub fn dirs(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = self
            .watchers
            .iter()
            .map(|w| w.value().dir().to_path_buf())
            .collect();
        dirs.sort();
        dirs
    }

    pub fn len(&self) -> usize {
        self.watchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.watchers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::store::TokenStore;
    use crate::types::KeyPolicy;

    fn manual_registry() -> WatcherRegistry {
        let evictor = Evictor::new(Arc::new(TokenStore::new()), KeyPolicy::default(), None);
        WatcherRegistry::new(WatchMode::Manual, Arc::new(evictor))
    }

    #[test]
    fn one_watcher_per_directory() {
        let registry = manual_registry();
        assert!(registry.ensure_watching(Path::new("/www/css")).unwrap());
        assert!(!registry.ensure_watching(Path::new("/www/css")).unwrap());
        assert!(!registry.ensure_watching(Path::new("/WWW/CSS")).unwrap());
        assert!(registry.ensure_watching(Path::new("/www/js")).unwrap());

        assert_eq!(registry.len(), 2);
        assert!(registry.is_watching(Path::new("/www/css")));
        assert_eq!(
            registry.dirs(),
            vec![PathBuf::from("/www/css"), PathBuf::from("/www/js")]
        );
    }

    #[test]
    fn notify_mode_rejects_missing_directory() {
        let evictor = Evictor::new(Arc::new(TokenStore::new()), KeyPolicy::default(), None);
        let registry = WatcherRegistry::new(WatchMode::Notify, Arc::new(evictor));
        let missing = Path::new("/definitely/not/a/real/dir/for/cachebust");
        assert!(registry.ensure_watching(missing).is_err());
        assert!(registry.is_empty());
    }
}
