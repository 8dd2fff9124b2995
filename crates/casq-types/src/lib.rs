//! # Shared Types
//!
//! Domain types shared across the casq quantum subsystem crates.
//!
//! ## Clusters
//!
//! - **Hashing**: `Hash`, [`sha256`]
//! - **Chain parameters**: [`NetworkId`], [`ChainParams`]
//! - **Chain data**: [`Block`], [`Transaction`], [`TxInput`] (the minimal
//!   shapes the registry rebuild scan needs — full block validation lives
//!   elsewhere)

pub mod chain;
pub mod params;

pub use chain::{Block, Transaction, TxInput, WitnessStack};
pub use params::{ChainParams, NetworkId};

use sha2::{Digest, Sha256};

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// Compute the SHA-256 hash of `data`.
///
/// This is the hash used for quantum witness programs and registry keys:
/// program = SHA-256(public key).
pub fn sha256(data: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha256_known_vector() {
        // SHA-256("abc")
        let digest = sha256(b"abc");
        assert_eq!(
            hex::encode(digest),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }
}
