//! RSA key management
//!
//! Provides key pair generation, PKCS#1 v1.5 signing and verification.
//! Messages are hashed with SHA-256 before signing.

use rand::rngs::OsRng;
use rsa::pkcs1::{EncodeRsaPublicKey, LineEnding};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha2::Sha256;
use thiserror::Error;

use super::hash::sha256;

/// Default modulus size for generated keys
pub const DEFAULT_KEY_BITS: usize = 2048;

/// Errors that can occur during key operations
#[derive(Error, Debug)]
pub enum KeyError {
    #[error("error generating RSA key: {0}")]
    Generation(#[source] rsa::Error),
    #[error("error signing data: {0}")]
    Signing(#[source] rsa::Error),
    #[error("signature verification failed")]
    VerificationFailed,
    #[error("error encoding public key: {0}")]
    Encoding(#[from] rsa::pkcs1::Error),
}

/// A key pair consisting of a private key and its corresponding public key
#[derive(Clone)]
pub struct KeyPair {
    pub private_key: RsaPrivateKey,
    pub public_key: RsaPublicKey,
}

impl KeyPair {
    /// Generate a new random key pair with a modulus of `bits` bits
    pub fn generate(bits: usize) -> Result<Self, KeyError> {
        let private_key = RsaPrivateKey::new(&mut OsRng, bits).map_err(KeyError::Generation)?;
        Ok(Self::from_private_key(private_key))
    }

    /// Create a key pair from an existing private key
    pub fn from_private_key(private_key: RsaPrivateKey) -> Self {
        let public_key = RsaPublicKey::from(&private_key);
        Self {
            private_key,
            public_key,
        }
    }

    /// Bit length of the public modulus
    pub fn modulus_bits(&self) -> usize {
        self.public_key.n().bits()
    }

    /// Public key as PKCS#1 PEM
    pub fn public_key_pem(&self) -> Result<String, KeyError> {
        Ok(self.public_key.to_pkcs1_pem(LineEnding::LF)?)
    }

    /// Sign data with the private key
    pub fn sign(&self, data: &[u8]) -> Result<Vec<u8>, KeyError> {
        sign_data(&self.private_key, data)
    }

    /// Verify a signature against this key pair's public key
    pub fn verify(&self, data: &[u8], signature: &[u8]) -> Result<(), KeyError> {
        verify_signature(&self.public_key, data, signature)
    }
}

/// Sign the SHA-256 hash of `data` with PKCS#1 v1.5 padding
pub fn sign_data(private_key: &RsaPrivateKey, data: &[u8]) -> Result<Vec<u8>, KeyError> {
    let hashed = sha256(data);
    // The rng only blinds the private operation; output is deterministic
    private_key
        .sign_with_rng(&mut OsRng, Pkcs1v15Sign::new::<Sha256>(), &hashed)
        .map_err(KeyError::Signing)
}

/// Verify a PKCS#1 v1.5 signature over the SHA-256 hash of `data`
pub fn verify_signature(
    public_key: &RsaPublicKey,
    data: &[u8],
    signature: &[u8],
) -> Result<(), KeyError> {
    let hashed = sha256(data);
    public_key
        .verify(Pkcs1v15Sign::new::<Sha256>(), &hashed, signature)
        .map_err(|_| KeyError::VerificationFailed)
}
