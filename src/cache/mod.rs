// src/cache/mod.rs

//! In-memory token cache.
//!
//! - [`store`]: the path → token map with per-slot generations.
//! - [`locks`]: per-path computation locks.
//! - [`hash_cache`]: the [`HashCache`] service tying both to the checksum,
//!   the token encoder and the directory watchers.

pub mod hash_cache;
pub mod locks;
pub mod store;

pub use hash_cache::{CacheOptions, HashCache};
pub use locks::LockRegistry;
pub use store::{CachedToken, TokenStore};
