// src/engine/mod.rs

//! Runtime for the `cachebust` binary.
//!
//! Renders stamped URLs for a fixed list of assets, then (in `--watch` mode)
//! reacts to evictions announced by the cache's watchers by rendering the
//! affected assets again. Hashing runs on tokio's blocking pool.

pub mod runtime;

pub use runtime::{Runtime, StampedAsset};
