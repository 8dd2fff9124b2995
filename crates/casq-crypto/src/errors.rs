//! Crypto error types.

use thiserror::Error;

/// Cryptographic operation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CryptoError {
    /// Invalid private key
    #[error("Invalid private key")]
    InvalidPrivateKey,

    /// Invalid key length
    #[error("Invalid key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Expected key length in bytes
        expected: usize,
        /// Actual key length in bytes
        actual: usize,
    },

    /// Signature is structurally invalid
    #[error("Invalid signature")]
    InvalidSignature,

    /// Signature is not in canonical form (malleability defense)
    #[error("Signature not in canonical form")]
    NonCanonicalSignature,

    /// Signing failed
    #[error("Signing failed")]
    SigningFailed,

    /// Key container bytes could not be decoded
    #[error("Invalid key encoding: {0}")]
    InvalidKeyEncoding(String),

    /// FALCON-512 support is compiled out
    #[error("Quantum signature support is disabled")]
    QuantumDisabled,
}
