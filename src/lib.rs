//! pow-signer: proof-of-work search with RSA signing of the result
//!
//! This crate provides:
//! - A SHA-256 proof-of-work search for the smallest nonce whose digest of
//!   `identifier ++ decimal(nonce)` starts with a run of '0' hex digits
//! - Optional iteration and time bounds, and a multi-threaded search that
//!   returns the same minimal nonce
//! - RSA key generation with PKCS#1 v1.5 signing and verification
//!
//! # Example
//!
//! ```rust
//! use pow_signer::crypto::KeyPair;
//! use pow_signer::mining::ProofOfWork;
//!
//! let solution = ProofOfWork::new("ruochen", 2).solve();
//! assert!(solution.hash.starts_with("00"));
//!
//! let key_pair = KeyPair::generate(1024).unwrap();
//! let signature = key_pair.sign(solution.content.as_bytes()).unwrap();
//! assert!(key_pair.verify(solution.content.as_bytes(), &signature).is_ok());
//! ```

pub mod cli;
pub mod crypto;
pub mod mining;

// Re-export commonly used types
pub use cli::DemoConfig;
pub use crypto::{KeyError, KeyPair};
pub use mining::{find_proof_of_work, PowError, PowSolution, ProofOfWork, SearchLimit};
