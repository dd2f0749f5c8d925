// src/cache/hash_cache.rs

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::cache::locks::LockRegistry;
use crate::cache::store::{CachedToken, TokenStore};
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::hash::{checksum_file, encode_token};
use crate::types::{KeyPolicy, PathKey};
use crate::watch::{Evictor, Invalidation, InvalidationKind, WatchMode, WatcherRegistry};

/// Behaviour switches for [`HashCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheOptions {
    /// Re-check size and modification time before trusting a cached token.
    pub verify_metadata: bool,
    /// Treat paths differing only in letter case as the same file.
    pub case_insensitive_keys: bool,
    pub watch_mode: WatchMode,
}

impl Default for CacheOptions {
    fn default() -> Self {
        Self {
            verify_metadata: false,
            case_insensitive_keys: true,
            watch_mode: WatchMode::Notify,
        }
    }
}

/// Lazily computed, watcher-invalidated cache of per-file tokens.
///
/// Construct one per process and share it behind an `Arc`; every method takes
/// `&self`. Computation for one path is serialized by that path's lock, while
/// distinct paths proceed in parallel.
#[derive(Debug)]
pub struct HashCache {
    fs: Arc<dyn FileSystem>,
    options: CacheOptions,
    keys: KeyPolicy,
    tokens: Arc<TokenStore>,
    locks: LockRegistry,
    watchers: WatcherRegistry,
}

impl HashCache {
    pub fn new(fs: Arc<dyn FileSystem>, options: CacheOptions) -> Self {
        Self::build(fs, options, None)
    }

    /// Like [`HashCache::new`], but every watcher-driven eviction is also
    /// announced on `notifier`.
    pub fn with_notifier(
        fs: Arc<dyn FileSystem>,
        options: CacheOptions,
        notifier: mpsc::UnboundedSender<Invalidation>,
    ) -> Self {
        Self::build(fs, options, Some(notifier))
    }

    fn build(
        fs: Arc<dyn FileSystem>,
        options: CacheOptions,
        notifier: Option<mpsc::UnboundedSender<Invalidation>>,
    ) -> Self {
        let keys = KeyPolicy {
            case_insensitive: options.case_insensitive_keys,
        };
        let tokens = Arc::new(TokenStore::new());
        let evictor = Arc::new(Evictor::new(Arc::clone(&tokens), keys, notifier));
        Self {
            fs,
            options,
            keys,
            tokens,
            locks: LockRegistry::new(),
            watchers: WatcherRegistry::new(options.watch_mode, evictor),
        }
    }

    /// Token for `path`, or `path` itself when no token can be produced.
    ///
    /// Never fails: callers compare the result with their input and render
    /// the URL without a suffix when they are equal. Callers holding a
    /// non-UTF-8 path use [`HashCache::try_token`] instead.
    pub fn get_token(&self, path: &str) -> String {
        match self.try_token(path) {
            Ok(token) => token,
            Err(err) => {
                warn!(path, error = %err, "could not compute token; using path as-is");
                path.to_owned()
            }
        }
    }

    /// Token for `path`, computing and caching it on a miss.
    ///
    /// Failed computations cache nothing, so the next call retries.
    pub fn try_token(&self, path: impl AsRef<Path>) -> Result<String> {
        let file = self.canonical(path.as_ref());
        let key = self.keys.key(&file);

        let lock = self.locks.lock_for(&key);
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(cached) = self.tokens.get(&key) {
            if !self.options.verify_metadata || self.still_matches(&file, &cached) {
                return Ok(cached.token);
            }
            debug!(?file, "file metadata changed since hashing; recomputing");
            self.tokens.evict(&key);
        }

        let generation = self.tokens.begin(&key);
        // Taken before the read so a write racing the read shows up next time.
        let fingerprint = if self.options.verify_metadata {
            self.fs.fingerprint(&file).ok()
        } else {
            None
        };

        debug!(?file, "cache miss: computing token");
        let checksum = match checksum_file(self.fs.as_ref(), &file) {
            Ok(checksum) => checksum,
            Err(err) => {
                self.tokens.abandon(&key);
                return Err(err);
            }
        };
        let token = encode_token(checksum);

        let stored = self.tokens.commit(
            &key,
            generation,
            CachedToken {
                token: token.clone(),
                fingerprint,
            },
        );
        if !stored {
            debug!(?file, "invalidated while computing; token not cached");
        }

        if let Some(dir) = file.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(err) = self.watchers.ensure_watching(dir) {
                warn!(?dir, error = %err, "failed to watch directory; entries there will not be invalidated");
            }
        }

        Ok(token)
    }

    /// Evict the cached token for `path`, as a change event would.
    ///
    /// Returns `true` if a token was cached.
    pub fn invalidate(&self, path: impl AsRef<Path>) -> bool {
        let file = self.canonical(path.as_ref());
        self.watchers
            .evictor()
            .evict(&file, InvalidationKind::Changed)
    }

    /// Start watching `dir` ahead of any request for files inside it.
    pub fn watch_directory(&self, dir: impl AsRef<Path>) -> Result<bool> {
        let dir = self.canonical(dir.as_ref());
        self.watchers.ensure_watching(&dir)
    }

    /// Registry key `path` is cached under.
    pub fn key_for(&self, path: impl AsRef<Path>) -> PathKey {
        self.keys.key(&self.canonical(path.as_ref()))
    }

    pub fn is_cached(&self, path: impl AsRef<Path>) -> bool {
        let file = self.canonical(path.as_ref());
        self.tokens.contains(&self.keys.key(&file))
    }

    /// Number of cached tokens.
    pub fn cached_len(&self) -> usize {
        self.tokens.len()
    }

    /// Number of per-path locks ever created.
    pub fn lock_count(&self) -> usize {
        self.locks.len()
    }

    pub fn watched_dirs(&self) -> Vec<PathBuf> {
        self.watchers.dirs()
    }

    fn canonical(&self, path: &Path) -> PathBuf {
        self.fs
            .canonicalize(path)
            .unwrap_or_else(|_| path.to_path_buf())
    }

    fn still_matches(&self, file: &Path, cached: &CachedToken) -> bool {
        match (cached.fingerprint, self.fs.fingerprint(file)) {
            (Some(recorded), Ok(current)) => recorded == current,
            _ => false,
        }
    }
}
