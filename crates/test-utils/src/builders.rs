#![allow(dead_code)]

use std::path::PathBuf;

use cachebust::config::{ConfigFile, RawConfigFile};

/// Builder for `ConfigFile` to simplify test setup.
pub struct ConfigFileBuilder {
    config: RawConfigFile,
}

impl ConfigFileBuilder {
    pub fn new() -> Self {
        Self {
            config: RawConfigFile::default(),
        }
    }

    pub fn web_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.config.web_root = root.into();
        self
    }

    pub fn verify_metadata(mut self, val: bool) -> Self {
        self.config.config.verify_metadata = val;
        self
    }

    pub fn case_insensitive_keys(mut self, val: bool) -> Self {
        self.config.config.case_insensitive_keys = val;
        self
    }

    pub fn with_watch_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.watch.roots.push(root.into());
        self
    }

    pub fn build(self) -> ConfigFile {
        ConfigFile::try_from(self.config).expect("Failed to build valid config from builder")
    }
}

impl Default for ConfigFileBuilder {
    fn default() -> Self {
        Self::new()
    }
}
