// src/hash/mod.rs

//! Content fingerprinting.
//!
//! - [`checksum`] streams a file through a table-driven CRC-32.
//! - [`token`] turns the 32-bit checksum into a short URL-safe token.
//!
//! Neither module caches anything; memoization lives in [`crate::cache`].

pub mod checksum;
pub mod token;

pub use checksum::{checksum_file, checksum_reader, Crc32};
pub use token::{encode_token, TOKEN_LEN};
