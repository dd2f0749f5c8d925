// src/resolve.rs

//! Mapping asset references onto files.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::fs::FileSystem;

/// Characters that mark an asset reference as relative to the web root.
const VIRTUAL_PREFIXES: [char; 3] = ['~', '/', '.'];

/// Maps a possibly virtual asset reference to an existing file.
///
/// `None` means "skip, produce no token".
pub trait PathResolver: Send + Sync {
    fn resolve(&self, asset: &str) -> Option<PathBuf>;
}

/// Resolves `~/css/site.css`, `/css/site.css` and `./css/site.css` against a
/// web root directory. Anything else is taken as a filesystem path.
#[derive(Debug, Clone)]
pub struct WebRootResolver {
    root: PathBuf,
    fs: Arc<dyn FileSystem>,
}

impl WebRootResolver {
    pub fn new(root: impl Into<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            root: root.into(),
            fs,
        }
    }

    fn map_virtual(&self, asset: &str) -> Option<PathBuf> {
        let relative = asset.trim_start_matches('~').trim_start_matches('/');

        let mut path = self.root.clone();
        for component in Path::new(relative).components() {
            match component {
                Component::Normal(part) => path.push(part),
                Component::CurDir => {}
                // Never let a virtual path climb out of the web root.
                Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
            }
        }
        Some(path)
    }
}

impl PathResolver for WebRootResolver {
    fn resolve(&self, asset: &str) -> Option<PathBuf> {
        let asset = strip_query(asset);
        if asset.is_empty() {
            return None;
        }

        let path = if asset.starts_with(VIRTUAL_PREFIXES) {
            self.map_virtual(asset)?
        } else {
            PathBuf::from(asset)
        };

        if self.fs.is_file(&path) {
            Some(path)
        } else {
            trace!(asset, ?path, "asset does not resolve to a file");
            None
        }
    }
}

/// Drop any `?query` or `#fragment` from an asset reference.
pub fn strip_query(asset: &str) -> &str {
    match asset.find(['?', '#']) {
        Some(idx) => &asset[..idx],
        None => asset,
    }
}
