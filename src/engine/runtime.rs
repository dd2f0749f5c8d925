// src/engine/runtime.rs

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cache::HashCache;
use crate::errors::Result;
use crate::resolve::PathResolver;
use crate::types::PathKey;
use crate::url::stamp_url;
use crate::watch::Invalidation;

/// An asset reference together with its current stamped URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StampedAsset {
    pub asset: String,
    pub url: String,
}

struct TrackedAsset {
    asset: String,
    /// `None` when the asset did not resolve to a file.
    key: Option<PathKey>,
}

/// Drives URL rendering in response to cache evictions.
pub struct Runtime {
    cache: Arc<HashCache>,
    resolver: Arc<dyn PathResolver>,
    assets: Vec<TrackedAsset>,
    invalidations: mpsc::UnboundedReceiver<Invalidation>,
}

impl fmt::Debug for Runtime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("assets", &self.assets.len())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(
        cache: Arc<HashCache>,
        resolver: Arc<dyn PathResolver>,
        assets: Vec<String>,
        invalidations: mpsc::UnboundedReceiver<Invalidation>,
    ) -> Self {
        let assets = assets
            .into_iter()
            .map(|asset| {
                let key = resolver.resolve(&asset).map(|path| cache.key_for(&path));
                TrackedAsset { asset, key }
            })
            .collect();
        Self {
            cache,
            resolver,
            assets,
            invalidations,
        }
    }

    /// Stamp every tracked asset, in the order given.
    pub async fn render_all(&self) -> Result<Vec<StampedAsset>> {
        let assets: Vec<String> = self.assets.iter().map(|a| a.asset.clone()).collect();
        self.render(assets).await
    }

    /// Main event loop.
    ///
    /// Every eviction of a tracked asset re-renders it and hands the result
    /// to `on_stamp`. Returns once `shutdown` completes.
    pub async fn run<S, F>(mut self, shutdown: S, mut on_stamp: F) -> Result<()>
    where
        S: Future<Output = ()>,
        F: FnMut(&StampedAsset),
    {
        info!(assets = self.assets.len(), "cachebust watch runtime started");
        tokio::pin!(shutdown);

        loop {
            let notice = tokio::select! {
                _ = &mut shutdown => {
                    info!("shutdown requested; stopping runtime");
                    break;
                }
                notice = self.invalidations.recv() => match notice {
                    Some(n) => n,
                    None => {
                        info!("invalidation channel closed; exiting");
                        break;
                    }
                },
            };

            debug!(?notice, "runtime received invalidation");

            let key = self.cache.key_for(&notice.path);
            let affected: Vec<String> = self
                .assets
                .iter()
                .filter(|a| a.key.as_ref() == Some(&key))
                .map(|a| a.asset.clone())
                .collect();
            if affected.is_empty() {
                continue;
            }

            for stamped in self.render(affected).await? {
                on_stamp(&stamped);
            }
        }

        info!("runtime exiting");
        Ok(())
    }

    async fn render(&self, assets: Vec<String>) -> Result<Vec<StampedAsset>> {
        let cache = Arc::clone(&self.cache);
        let resolver = Arc::clone(&self.resolver);

        let stamped = tokio::task::spawn_blocking(move || {
            assets
                .into_iter()
                .map(|asset| {
                    let url = stamp_url(&cache, resolver.as_ref(), &asset);
                    StampedAsset { asset, url }
                })
                .collect::<Vec<_>>()
        })
        .await
        .map_err(|err| {
            warn!("hashing task failed: {err}");
            anyhow::Error::new(err)
        })?;

        Ok(stamped)
    }
}
