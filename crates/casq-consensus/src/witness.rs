//! # Quantum Witness Codec
//!
//! Only the first witness stack element is interpreted. Two forms exist:
//!
//! | Field | Registration | Reference |
//! |---|---|---|
//! | Marker | `0x51` | `0x52` |
//! | Payload | 897-byte public key | 32-byte key hash |
//! | Signature | 1..=700 bytes | 1..=700 bytes |
//!
//! A registration spend carries the full key inline so the registry can
//! learn it; every later spend references the key by hash alone.

use sha2::{Digest, Sha256};

use casq_crypto::falcon;
use casq_types::Hash;

use crate::errors::WitnessError;

/// Marker byte for a key-registration witness.
pub const MARKER_REGISTRATION: u8 = 0x51;
/// Marker byte for a key-reference witness.
pub const MARKER_REFERENCE: u8 = 0x52;
/// Largest signature a witness may carry.
pub const MAX_SIGNATURE_SIZE: usize = 700;

const HASH_SIZE: usize = 32;

/// A parsed quantum witness.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QuantumWitness {
    /// First spend from a key: the full public key travels with it.
    Registration {
        /// FALCON-512 public key, 897 bytes.
        pubkey: Vec<u8>,
        /// Detached signature over the signature hash.
        signature: Vec<u8>,
    },
    /// Subsequent spend: the key is referenced by its SHA-256 hash.
    Reference {
        /// SHA-256 of the public key.
        pubkey_hash: Hash,
        /// Detached signature over the signature hash.
        signature: Vec<u8>,
    },
}

impl QuantumWitness {
    /// Whether this witness registers a key.
    pub fn is_registration(&self) -> bool {
        matches!(self, QuantumWitness::Registration { .. })
    }

    /// The hash identifying the spending key. For registrations this is
    /// computed from the embedded key.
    pub fn pubkey_hash(&self) -> Hash {
        match self {
            QuantumWitness::Registration { pubkey, .. } => Sha256::digest(pubkey).into(),
            QuantumWitness::Reference { pubkey_hash, .. } => *pubkey_hash,
        }
    }

    /// The signature bytes.
    pub fn signature(&self) -> &[u8] {
        match self {
            QuantumWitness::Registration { signature, .. } => signature,
            QuantumWitness::Reference { signature, .. } => signature,
        }
    }
}

/// Parse the first element of a witness stack as a quantum witness.
pub fn parse_witness(stack: &[Vec<u8>]) -> Result<QuantumWitness, WitnessError> {
    let element = stack.first().ok_or(WitnessError::EmptyStack)?;
    let marker = *element.first().ok_or(WitnessError::EmptyElement)?;

    match marker {
        MARKER_REGISTRATION => {
            let min = 1 + falcon::PUBLIC_KEY_SIZE + 1;
            let max = 1 + falcon::PUBLIC_KEY_SIZE + MAX_SIGNATURE_SIZE;
            if element.len() < min || element.len() > max {
                return Err(WitnessError::InvalidSize {
                    marker,
                    actual: element.len(),
                });
            }
            Ok(QuantumWitness::Registration {
                pubkey: element[1..1 + falcon::PUBLIC_KEY_SIZE].to_vec(),
                signature: element[1 + falcon::PUBLIC_KEY_SIZE..].to_vec(),
            })
        }
        MARKER_REFERENCE => {
            let min = 1 + HASH_SIZE + 1;
            let max = 1 + HASH_SIZE + MAX_SIGNATURE_SIZE;
            if element.len() < min || element.len() > max {
                return Err(WitnessError::InvalidSize {
                    marker,
                    actual: element.len(),
                });
            }
            let mut pubkey_hash = [0u8; HASH_SIZE];
            pubkey_hash.copy_from_slice(&element[1..1 + HASH_SIZE]);
            Ok(QuantumWitness::Reference {
                pubkey_hash,
                signature: element[1 + HASH_SIZE..].to_vec(),
            })
        }
        other => Err(WitnessError::UnknownMarker(other)),
    }
}

/// Build a registration witness element: marker, full key, signature.
pub fn build_registration(pubkey: &[u8], signature: &[u8]) -> Result<Vec<u8>, WitnessError> {
    if pubkey.len() != falcon::PUBLIC_KEY_SIZE {
        return Err(WitnessError::InvalidKeyLength {
            expected: falcon::PUBLIC_KEY_SIZE,
            actual: pubkey.len(),
        });
    }
    if signature.is_empty() || signature.len() > MAX_SIGNATURE_SIZE {
        return Err(WitnessError::InvalidSignatureLength(signature.len()));
    }
    let mut element = Vec::with_capacity(1 + pubkey.len() + signature.len());
    element.push(MARKER_REGISTRATION);
    element.extend_from_slice(pubkey);
    element.extend_from_slice(signature);
    Ok(element)
}

/// Build a reference witness element: marker, key hash, signature.
pub fn build_reference(pubkey_hash: &Hash, signature: &[u8]) -> Result<Vec<u8>, WitnessError> {
    if signature.is_empty() || signature.len() > MAX_SIGNATURE_SIZE {
        return Err(WitnessError::InvalidSignatureLength(signature.len()));
    }
    let mut element = Vec::with_capacity(1 + HASH_SIZE + signature.len());
    element.push(MARKER_REFERENCE);
    element.extend_from_slice(pubkey_hash);
    element.extend_from_slice(signature);
    Ok(element)
}
