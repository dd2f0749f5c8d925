// src/types.rs

use std::fmt;
use std::path::Path;

/// Normalized registry key for a file or directory path.
///
/// The token map, the lock registry and the watcher registry are all keyed by
/// `PathKey`, and watcher events are normalized the same way, so a change
/// event for a path always lands on the entry that was computed for it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PathKey(String);

impl PathKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PathKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How paths are turned into [`PathKey`]s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPolicy {
    /// Compare paths without regard to letter case.
    pub case_insensitive: bool,
}

impl KeyPolicy {
    pub fn key(&self, path: &Path) -> PathKey {
        let text = path.to_string_lossy();
        if self.case_insensitive {
            PathKey(text.to_lowercase())
        } else {
            PathKey(text.into_owned())
        }
    }
}

impl Default for KeyPolicy {
    fn default() -> Self {
        Self {
            case_insensitive: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_keys_fold_case() {
        let policy = KeyPolicy::default();
        assert_eq!(
            policy.key(Path::new("/www/CSS/Site.css")),
            policy.key(Path::new("/www/css/site.CSS"))
        );
    }

    #[test]
    fn case_sensitive_keys_keep_case() {
        let policy = KeyPolicy {
            case_insensitive: false,
        };
        assert_ne!(
            policy.key(Path::new("/www/Site.css")),
            policy.key(Path::new("/www/site.css"))
        );
    }
}
