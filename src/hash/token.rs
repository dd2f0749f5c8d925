// src/hash/token.rs

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

/// Length of every token produced by [`encode_token`].
pub const TOKEN_LEN: usize = 7;

/// Encode a checksum as a URL-safe token.
///
/// The four checksum bytes are taken little-endian, base64-encoded with the
/// URL-safe alphabet, and the stripped padding count is appended as a digit.
/// The result needs no escaping inside a query string.
pub fn encode_token(checksum: u32) -> String {
    let bytes = checksum.to_le_bytes();
    let mut token = URL_SAFE_NO_PAD.encode(bytes);
    let padding = (3 - bytes.len() % 3) % 3;
    token.push(char::from(b'0' + padding as u8));
    token
}
