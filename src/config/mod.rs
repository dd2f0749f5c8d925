// src/config/mod.rs

//! Configuration loading and validation for cachebust.
//!
//! Responsibilities:
//! - Define the TOML-backed data model (`model.rs`).
//! - Load a config file from disk (`loader.rs`).
//! - Validate basic invariants like watch roots staying inside the web root
//!   (`validate.rs`).

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{
    default_config_path, load_and_validate, load_from_path, load_or_default, load_or_default_in,
    DEFAULT_CONFIG_FILE,
};
pub use model::{ConfigFile, ConfigSection, RawConfigFile, WatchSection};
