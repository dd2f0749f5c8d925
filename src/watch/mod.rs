// src/watch/mod.rs

//! Filesystem-driven cache invalidation.
//!
//! This module is responsible for:
//! - Wiring up one non-recursive `notify` watcher per directory that holds a
//!   hashed file.
//! - Classifying change / rename / delete events.
//! - Evicting the matching token, and optionally announcing the eviction on a
//!   channel.
//!
//! It never recomputes anything; the next caller of the cache does that.

pub mod event_handler;
pub mod watcher;

pub use event_handler::{classify, Evictor, Invalidation, InvalidationKind};
pub use watcher::{spawn_dir_watcher, WatchMode, WatcherHandle, WatcherRegistry};
