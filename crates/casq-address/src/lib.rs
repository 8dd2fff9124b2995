//! # casq-address — Address Codec
//!
//! Checksummed text encoding of witness programs and recognition of
//! quantum addresses.
//!
//! | Module | Contents |
//! |--------|----------|
//! | `bech32` | BIP-173 / BIP-350 dual-constant codec, bit repacking |
//! | `quantum` | Quantum HRPs, witness v2 encoding, type-detecting decode |
//!
//! A quantum address is always Bech32m (BIP-350), witness version 2, with a
//! 32-byte program equal to SHA-256 of the FALCON-512 public key.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod bech32;
pub mod quantum;

pub use bech32::{convert_bits, Encoding};
pub use quantum::{
    decode_address, encode_quantum_address, encode_quantum_address_bytes, is_quantum_address,
    quantum_hrp, AddressError, DecodedAddress, QUANTUM_PROGRAM_SIZE, WITNESS_VERSION_QUANTUM,
};
