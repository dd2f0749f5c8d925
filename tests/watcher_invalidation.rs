// tests/watcher_invalidation.rs

//! End-to-end invalidation through real `notify` watchers on a temp dir.

use std::error::Error;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tempfile::tempdir;

use cachebust::cache::{CacheOptions, HashCache};
use cachebust::fs::RealFileSystem;
use cachebust::watch::InvalidationKind;
use cachebust_test_utils::{eventually, init_tracing};

type TestResult = Result<(), Box<dyn Error>>;

const EVENT_TIMEOUT: Duration = Duration::from_secs(5);

fn real_cache() -> HashCache {
    HashCache::new(Arc::new(RealFileSystem), CacheOptions::default())
}

fn token_for(cache: &HashCache, path: &Path) -> String {
    cache.get_token(path.to_str().expect("temp paths are UTF-8"))
}

#[test]
fn content_change_evicts_and_next_call_recomputes() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let file = dir.path().join("site.css");
    fs::write(&file, "body{}")?;

    let cache = real_cache();
    let t1 = token_for(&cache, &file);
    assert_ne!(t1, file.to_string_lossy());
    assert!(cache.is_cached(&file));
    assert_eq!(cache.watched_dirs(), vec![dir.path().canonicalize()?]);

    fs::write(&file, "body{color:red}")?;

    assert!(
        eventually(EVENT_TIMEOUT, || !cache.is_cached(&file)),
        "change event never evicted the cached token"
    );

    let t2 = token_for(&cache, &file);
    assert_ne!(t1, t2);
    Ok(())
}

#[test]
fn delete_and_rename_evict() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let doomed = dir.path().join("doomed.js");
    let moved = dir.path().join("moved.js");
    fs::write(&doomed, "1")?;
    fs::write(&moved, "2")?;

    let cache = real_cache();
    token_for(&cache, &doomed);
    token_for(&cache, &moved);
    assert_eq!(cache.cached_len(), 2);
    assert_eq!(cache.watched_dirs().len(), 1);

    fs::remove_file(&doomed)?;
    fs::rename(&moved, dir.path().join("moved-away.js"))?;

    assert!(
        eventually(EVENT_TIMEOUT, || cache.cached_len() == 0),
        "delete/rename events did not evict both entries"
    );

    // The deleted file now falls back to its path.
    assert_eq!(token_for(&cache, &doomed), doomed.to_string_lossy());
    Ok(())
}

#[test]
fn pre_registered_directory_is_reused() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let file = dir.path().join("app.js");
    fs::write(&file, "let a;")?;

    let cache = real_cache();
    assert!(cache.watch_directory(dir.path())?);
    assert!(!cache.watch_directory(dir.path())?);

    token_for(&cache, &file);
    assert_eq!(cache.watched_dirs().len(), 1);
    Ok(())
}

#[test]
fn evictions_are_announced_on_notifier() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let file = dir.path().join("site.css");
    fs::write(&file, "body{}")?;

    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let cache = HashCache::with_notifier(Arc::new(RealFileSystem), CacheOptions::default(), tx);
    token_for(&cache, &file);

    fs::write(&file, "body{margin:0}")?;

    let mut notice = None;
    assert!(eventually(EVENT_TIMEOUT, || {
        notice = rx.try_recv().ok();
        notice.is_some()
    }));
    let notice = notice.unwrap();
    assert_eq!(notice.kind, InvalidationKind::Changed);
    assert_eq!(
        notice.path.file_name().and_then(|n| n.to_str()),
        Some("site.css")
    );
    Ok(())
}

#[test]
fn files_in_subdirectories_get_their_own_watcher() -> TestResult {
    init_tracing();

    let dir = tempdir()?;
    let nested = dir.path().join("css");
    fs::create_dir(&nested)?;
    fs::write(dir.path().join("top.js"), "1")?;
    fs::write(nested.join("site.css"), "body{}")?;

    let cache = real_cache();
    token_for(&cache, &dir.path().join("top.js"));
    token_for(&cache, &nested.join("site.css"));

    // Watchers are non-recursive: one per directory holding a hashed file.
    assert_eq!(cache.watched_dirs().len(), 2);

    fs::write(nested.join("site.css"), "body{padding:0}")?;
    assert!(eventually(EVENT_TIMEOUT, || !cache.is_cached(nested.join("site.css"))));
    assert!(cache.is_cached(dir.path().join("top.js")));
    Ok(())
}
