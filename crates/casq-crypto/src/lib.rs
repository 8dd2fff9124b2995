//! # casq-crypto — Key and Signature Primitives
//!
//! Two signature algorithms live behind one key container:
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `ecdsa` | secp256k1 | Legacy transaction signing |
//! | `falcon` | FALCON-512 | Post-quantum transaction signing |
//! | `keys` | both | Tagged key container, dispatch by algorithm |
//!
//! ## Security Properties
//!
//! - **secp256k1**: RFC 6979 deterministic nonces, low-S normalization
//! - **FALCON-512**: NIST level 1, canonical-form enforcement on every
//!   signature produced and accepted (anti-malleability)
//! - Secret key material is zeroized on drop

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod ecdsa;
pub mod errors;
pub mod falcon;
pub mod keys;

pub use errors::CryptoError;
pub use keys::{CasqKey, CasqPublicKey, KeyAlgorithm};
