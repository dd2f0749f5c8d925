// src/errors.rs

//! Crate-wide error aliases and helpers.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CachebustError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// The file exists but could not be read when its checksum was computed
    /// (e.g. held under an exclusive lock by another process).
    #[error("failed to read {path:?} for hashing")]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },

    #[error("file watch error: {0}")]
    WatchError(#[from] notify::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, CachebustError>;
