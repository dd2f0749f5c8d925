// src/lib.rs

pub mod cache;
pub mod cli;
pub mod config;
pub mod engine;
pub mod errors;
pub mod fs;
pub mod hash;
pub mod logging;
pub mod resolve;
pub mod types;
pub mod url;
pub mod watch;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::HashCache;
use crate::cli::CliArgs;
use crate::config::{load_or_default, ConfigFile};
use crate::engine::Runtime;
use crate::fs::{FileSystem, RealFileSystem};
use crate::resolve::{PathResolver, WebRootResolver};
use crate::watch::WatchMode;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading (plus `--root` override)
/// - the shared `HashCache` and web-root resolver
/// - pre-registered watch roots
/// - the watch runtime and Ctrl-C handling (with `--watch`)
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = load_config(&args)?;

    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let resolver: Arc<dyn PathResolver> =
        Arc::new(WebRootResolver::new(cfg.config.web_root.clone(), Arc::clone(&fs)));

    if args.dry_run {
        print_dry_run(&cfg, resolver.as_ref(), &args.assets);
        return Ok(());
    }

    // One-shot runs never see a change, so they skip OS watchers entirely.
    let mut options = cfg.cache_options();
    if !args.watch {
        options.watch_mode = WatchMode::Manual;
    }

    let (inv_tx, inv_rx) = mpsc::unbounded_channel();
    let cache = Arc::new(HashCache::with_notifier(fs, options, inv_tx));

    if args.watch {
        for dir in cfg.watch_dirs() {
            if let Err(err) = cache.watch_directory(&dir) {
                warn!(?dir, error = %err, "could not pre-register watch root");
            }
        }
    }

    let runtime = Runtime::new(Arc::clone(&cache), resolver, args.assets.clone(), inv_rx);

    for stamped in runtime.render_all().await? {
        println!("{}", stamped.url);
    }

    if !args.watch {
        return Ok(());
    }

    info!(dirs = ?cache.watched_dirs(), "watching for asset changes; press Ctrl-C to stop");

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            eprintln!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    runtime
        .run(shutdown, |stamped| println!("{}", stamped.url))
        .await?;
    Ok(())
}

/// Config selected by `--config` (or the default file), with `--root`
/// applied on top.
pub fn load_config(args: &CliArgs) -> Result<ConfigFile> {
    let mut cfg = load_or_default(args.config.as_deref())?;
    if let Some(root) = args.root.clone() {
        cfg.config.web_root = root;
    }
    Ok(cfg)
}

/// Simple dry-run output: print config and where each asset resolves.
fn print_dry_run(cfg: &ConfigFile, resolver: &dyn PathResolver, assets: &[String]) {
    println!("cachebust dry-run");
    println!("  config.web_root = {:?}", cfg.config.web_root);
    println!("  config.verify_metadata = {}", cfg.config.verify_metadata);
    println!(
        "  config.case_insensitive_keys = {}",
        cfg.config.case_insensitive_keys
    );
    if !cfg.watch.roots.is_empty() {
        println!("  watch.roots = {:?}", cfg.watch.roots);
    }
    println!();

    println!("assets ({}):", assets.len());
    for asset in assets {
        match resolver.resolve(asset) {
            Some(path) => println!("  - {asset} -> {}", path.display()),
            None => println!("  - {asset} -> (not found)"),
        }
    }

    debug!("dry-run complete (nothing hashed)");
}
