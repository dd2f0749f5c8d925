// src/config/validate.rs

use std::collections::HashSet;
use std::path::{Component, Path};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::{CachebustError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::CachebustError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_raw_config(&raw)?;
        Ok(ConfigFile::new_unchecked(raw.config, raw.watch))
    }
}

fn validate_raw_config(cfg: &RawConfigFile) -> Result<()> {
    validate_web_root(cfg)?;
    validate_watch_roots(cfg)?;
    Ok(())
}

fn validate_web_root(cfg: &RawConfigFile) -> Result<()> {
    if cfg.config.web_root.as_os_str().is_empty() {
        return Err(CachebustError::ConfigError(
            "[config].web_root must not be empty".to_string(),
        ));
    }
    Ok(())
}

fn validate_watch_roots(cfg: &RawConfigFile) -> Result<()> {
    let mut seen = HashSet::new();
    for root in cfg.watch.roots.iter() {
        if root.as_os_str().is_empty() {
            return Err(CachebustError::ConfigError(
                "[watch].roots entries must not be empty".to_string(),
            ));
        }
        if escapes_web_root(root) {
            return Err(CachebustError::ConfigError(format!(
                "[watch].roots entry {:?} must stay inside web_root",
                root
            )));
        }
        if !seen.insert(root) {
            return Err(CachebustError::ConfigError(format!(
                "[watch].roots entry {:?} is listed twice",
                root
            )));
        }
    }
    Ok(())
}

fn escapes_web_root(root: &Path) -> bool {
    root.components().any(|c| {
        matches!(
            c,
            Component::ParentDir | Component::RootDir | Component::Prefix(_)
        )
    })
}
