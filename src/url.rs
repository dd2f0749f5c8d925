// src/url.rs

//! Appending cache-busting tokens to asset URLs.

use tracing::debug;

use crate::cache::HashCache;
use crate::resolve::PathResolver;

/// Append `token` to the query string of `url`.
///
/// A leading `~` is dropped. The token becomes the whole query (`?token`) or
/// is appended to an existing one (`&token`); a `#fragment` stays last.
pub fn append_token(url: &str, token: &str) -> String {
    let url = url.trim_start_matches('~');
    let (base, fragment) = match url.find('#') {
        Some(idx) => url.split_at(idx),
        None => (url, ""),
    };
    let separator = if base.contains('?') { '&' } else { '?' };
    format!("{base}{separator}{token}{fragment}")
}

/// Resolve `url`, look up its token and return the stamped URL.
///
/// Unresolvable assets and hashing failures yield the URL without a token
/// (still without its leading `~`), so rendering a page never fails here.
pub fn stamp_url(cache: &HashCache, resolver: &dyn PathResolver, url: &str) -> String {
    let Some(path) = resolver.resolve(url) else {
        debug!(url, "asset not resolvable; leaving URL unstamped");
        return url.trim_start_matches('~').to_string();
    };

    match cache.try_token(&path) {
        Ok(token) => append_token(url, &token),
        Err(err) => {
            debug!(url, error = %err, "no token for asset; leaving URL unstamped");
            url.trim_start_matches('~').to_string()
        }
    }
}
