// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; it does **not** perform semantic
/// validation. Use [`load_and_validate`] for that.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and run basic validation.
///
/// This is the recommended entry point for the rest of the application.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// File name looked up when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "Cachebust.toml";

/// Load `path` if given; otherwise load the default file when it exists and
/// fall back to built-in defaults when it does not.
pub fn load_or_default(path: Option<&Path>) -> Result<ConfigFile> {
    load_or_default_in(Path::new("."), path)
}

/// [`load_or_default`] with the default file looked up in `dir`.
///
/// An explicit `path` must exist; a missing default file is not an error.
pub fn load_or_default_in(dir: &Path, path: Option<&Path>) -> Result<ConfigFile> {
    match path {
        Some(path) => load_and_validate(path),
        None => {
            let default = default_config_path(dir);
            if default.is_file() {
                load_and_validate(default)
            } else {
                debug!(path = ?default, "no config file; using built-in defaults");
                Ok(ConfigFile::default())
            }
        }
    }
}

/// `Cachebust.toml` inside `dir`.
pub fn default_config_path(dir: &Path) -> PathBuf {
    dir.join(DEFAULT_CONFIG_FILE)
}
