// tests/runtime_watch.rs

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::time::{sleep, Duration};

use cachebust::cache::{CacheOptions, HashCache};
use cachebust::engine::{Runtime, StampedAsset};
use cachebust::fs::mock::MockFileSystem;
use cachebust::hash::{encode_token, Crc32};
use cachebust::resolve::{PathResolver, WebRootResolver};
use cachebust::watch::WatchMode;
use cachebust_test_utils::{init_tracing, with_timeout};

fn token_of(content: &str) -> String {
    encode_token(Crc32::checksum(content.as_bytes()))
}

fn setup() -> (MockFileSystem, Arc<HashCache>, Runtime) {
    let fs = MockFileSystem::new();
    fs.add_file("/srv/www/css/site.css", "body{}");
    fs.add_file("/srv/www/js/app.js", "let a = 1;");

    let (tx, rx) = mpsc::unbounded_channel();
    let cache = Arc::new(HashCache::with_notifier(
        Arc::new(fs.clone()),
        CacheOptions {
            watch_mode: WatchMode::Manual,
            ..CacheOptions::default()
        },
        tx,
    ));
    let resolver: Arc<dyn PathResolver> =
        Arc::new(WebRootResolver::new("/srv/www", Arc::new(fs.clone())));

    let runtime = Runtime::new(
        Arc::clone(&cache),
        resolver,
        vec![
            "~/css/site.css".to_string(),
            "~/js/app.js?v=2".to_string(),
            "~/img/missing.png".to_string(),
        ],
        rx,
    );
    (fs, cache, runtime)
}

#[tokio::test]
async fn initial_render_stamps_every_asset() {
    init_tracing();

    let (_fs, _cache, runtime) = setup();
    let stamped = runtime.render_all().await.unwrap();

    let urls: Vec<String> = stamped.into_iter().map(|s| s.url).collect();
    assert_eq!(
        urls,
        vec![
            format!("/css/site.css?{}", token_of("body{}")),
            format!("/js/app.js?v=2&{}", token_of("let a = 1;")),
            "/img/missing.png".to_string(),
        ]
    );
}

#[tokio::test]
async fn eviction_rerenders_only_the_affected_asset() {
    init_tracing();

    let (fs, cache, runtime) = setup();
    runtime.render_all().await.unwrap();

    fs.add_file("/srv/www/css/site.css", "body{}a");
    assert!(cache.invalidate("/srv/www/css/site.css"));

    let mut seen: Vec<StampedAsset> = Vec::new();
    with_timeout(runtime.run(sleep(Duration::from_millis(300)), |s| {
        seen.push(s.clone())
    }))
    .await
    .unwrap();

    assert_eq!(
        seen,
        vec![StampedAsset {
            asset: "~/css/site.css".to_string(),
            url: format!("/css/site.css?{}", token_of("body{}a")),
        }]
    );
}

#[tokio::test]
async fn shutdown_without_events_exits_cleanly() {
    init_tracing();

    let (_fs, _cache, runtime) = setup();
    let mut calls = 0;
    with_timeout(runtime.run(async {}, |_| calls += 1))
        .await
        .unwrap();
    assert_eq!(calls, 0);
}
