// src/config/model.rs

use std::path::PathBuf;

use serde::Deserialize;

use crate::cache::CacheOptions;
use crate::watch::WatchMode;

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [config]
/// web_root = "wwwroot"
/// verify_metadata = false
/// case_insensitive_keys = true
///
/// [watch]
/// roots = ["css", "js"]
/// ```
///
/// All sections are optional and have reasonable defaults.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub config: ConfigSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// Validated configuration. Only obtainable through `TryFrom<RawConfigFile>`.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub config: ConfigSection,
    pub watch: WatchSection,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(config: ConfigSection, watch: WatchSection) -> Self {
        Self { config, watch }
    }

    /// Cache options implied by `[config]`.
    pub fn cache_options(&self) -> CacheOptions {
        CacheOptions {
            verify_metadata: self.config.verify_metadata,
            case_insensitive_keys: self.config.case_insensitive_keys,
            watch_mode: WatchMode::Notify,
        }
    }

    /// Directories from `[watch].roots`, joined onto the web root.
    pub fn watch_dirs(&self) -> Vec<PathBuf> {
        self.watch
            .roots
            .iter()
            .map(|r| self.config.web_root.join(r))
            .collect()
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(ConfigSection::default(), WatchSection::default())
    }
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Directory that virtual asset paths (`~/…`, `/…`, `./…`) resolve against.
    #[serde(default = "default_web_root")]
    pub web_root: PathBuf,

    /// Re-check size and modification time before trusting a cached token.
    #[serde(default)]
    pub verify_metadata: bool,

    /// Compare paths case-insensitively.
    #[serde(default = "default_case_insensitive_keys")]
    pub case_insensitive_keys: bool,
}

fn default_web_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_case_insensitive_keys() -> bool {
    true
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            web_root: default_web_root(),
            verify_metadata: false,
            case_insensitive_keys: default_case_insensitive_keys(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct WatchSection {
    /// Asset directories (relative to `web_root`) watched from startup,
    /// before any file in them is requested.
    #[serde(default)]
    pub roots: Vec<PathBuf>,
}
