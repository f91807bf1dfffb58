//! SHA-256 hashing utilities
//!
//! Provides the digest functions used for proof-of-work candidates and
//! for the message hash that gets signed.

use sha2::{Digest, Sha256};

/// Length of a SHA-256 digest rendered as hex
pub const SHA256_HEX_LEN: usize = 64;

/// Computes SHA-256 hash of the input data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Computes SHA-256 hash and returns it as a lowercase hex string
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Checks if a hex digest starts with `difficulty` '0' characters
pub fn has_zero_prefix(hash_hex: &str, difficulty: usize) -> bool {
    hash_hex.len() >= difficulty && hash_hex.bytes().take(difficulty).all(|b| b == b'0')
}

/// Checks the raw digest for `difficulty` leading zero nibbles.
///
/// Equivalent to hex-encoding the digest and calling [`has_zero_prefix`],
/// without allocating the string.
pub fn meets_difficulty(hash: &[u8], difficulty: usize) -> bool {
    if difficulty > hash.len() * 2 {
        return false;
    }

    let full_bytes = difficulty / 2;

    for byte in hash.iter().take(full_bytes) {
        if *byte != 0 {
            return false;
        }
    }

    // Odd difficulty: high nibble of the next byte
    if difficulty % 2 == 1 && hash[full_bytes] & 0xF0 != 0 {
        return false;
    }

    true
}
