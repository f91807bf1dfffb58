//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing and the zero-prefix difficulty check
//! - RSA key management (PKCS#1 v1.5 signatures over SHA-256)

pub mod hash;
pub mod keys;

pub use hash::{has_zero_prefix, meets_difficulty, sha256, sha256_hex, SHA256_HEX_LEN};
pub use keys::{sign_data, verify_signature, KeyError, KeyPair, DEFAULT_KEY_BITS};
