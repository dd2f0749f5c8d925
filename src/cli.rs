// src/cli.rs

//! CLI argument parsing using `clap`.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Command-line arguments for `cachebust`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "cachebust",
    version,
    about = "Print asset URLs stamped with content-derived cache-busting tokens.",
    long_about = None
)]
pub struct CliArgs {
    /// Asset references to stamp, e.g. `~/css/site.css` or `/js/app.js?v=2`.
    #[arg(value_name = "ASSET", required = true)]
    pub assets: Vec<String>,

    /// Path to the config file (TOML).
    ///
    /// Default: `Cachebust.toml` in the current working directory, if present.
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Web root that virtual asset paths resolve against.
    ///
    /// Overrides `[config].web_root`.
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Keep running and print a fresh URL whenever a listed asset changes.
    #[arg(long)]
    pub watch: bool,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `CACHEBUST_LOG` or a default level will be used.
    #[arg(long, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve assets and print their paths, but don't hash anything.
    #[arg(long)]
    pub dry_run: bool,
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
