//! # Quantum Transaction Verification
//!
//! The terminal consensus-facing check for a quantum spend. Three things
//! can go wrong, each logged under its own message, but the caller only
//! ever sees a boolean:
//!
//! 1. A reference witness names a key the registry cannot resolve.
//! 2. SHA-256 of the spending key does not match the address program.
//! 3. The FALCON-512 signature does not verify over the signature hash.

use sha2::{Digest, Sha256};
use tracing::debug;

use casq_crypto::falcon;
use casq_types::Hash;

use crate::witness::QuantumWitness;

/// Resolves a public key hash to the registered key bytes.
///
/// Implemented by the pubkey registry; verification takes it as a port so
/// consensus code never depends on a concrete store.
pub trait PubkeyLookup {
    /// The registered key for `hash`, or `None` when unknown.
    fn lookup_pubkey(&self, hash: &Hash) -> Option<Vec<u8>>;
}

/// A lookup that resolves nothing.
///
/// Used when the registry failed to open: registration spends still verify
/// (the key travels inline) while reference spends fail closed.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledPubkeyLookup;

impl PubkeyLookup for DisabledPubkeyLookup {
    fn lookup_pubkey(&self, _hash: &Hash) -> Option<Vec<u8>> {
        None
    }
}

/// Verify a quantum spend: resolve the key, tie it to the address program,
/// check the signature.
pub fn verify_quantum_transaction(
    lookup: &dyn PubkeyLookup,
    witness: &QuantumWitness,
    sighash: &Hash,
    program: &[u8],
) -> bool {
    let pubkey = match witness {
        QuantumWitness::Registration { pubkey, .. } => {
            if pubkey.len() != falcon::PUBLIC_KEY_SIZE {
                debug!(size = pubkey.len(), "registration key has invalid size");
                return false;
            }
            pubkey.clone()
        }
        QuantumWitness::Reference { pubkey_hash, .. } => {
            match lookup.lookup_pubkey(pubkey_hash) {
                Some(pubkey) => pubkey,
                None => {
                    debug!(
                        hash = %hex_prefix(pubkey_hash),
                        "referenced public key not found in registry"
                    );
                    return false;
                }
            }
        }
    };

    let derived: Hash = Sha256::digest(&pubkey).into();
    if derived.as_slice() != program {
        debug!(
            derived = %hex_prefix(&derived),
            "public key does not derive the address program"
        );
        return false;
    }

    if !falcon::verify(&pubkey, sighash, witness.signature()) {
        debug!("quantum signature verification failed");
        return false;
    }

    true
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(8).map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
#[cfg(feature = "quantum")]
mod tests {
    use super::*;
    use crate::witness::{build_reference, build_registration, parse_witness};
    use casq_types::sha256;
    use std::collections::HashMap;

    struct MapLookup(HashMap<Hash, Vec<u8>>);

    impl PubkeyLookup for MapLookup {
        fn lookup_pubkey(&self, hash: &Hash) -> Option<Vec<u8>> {
            self.0.get(hash).cloned()
        }
    }

    fn signed_keypair(message: &Hash) -> (Vec<u8>, Vec<u8>) {
        let (privkey, pubkey) = falcon::generate_keypair().unwrap();
        let signature = falcon::sign(&privkey, message).unwrap();
        (pubkey, signature)
    }

    #[test]
    fn registration_spend_verifies() {
        let sighash = sha256(b"spend");
        let (pubkey, signature) = signed_keypair(&sighash);
        let program = sha256(&pubkey);

        let element = build_registration(&pubkey, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        assert!(verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sighash,
            &program,
        ));
    }

    #[test]
    fn reference_spend_requires_registry() {
        let sighash = sha256(b"spend");
        let (pubkey, signature) = signed_keypair(&sighash);
        let hash = sha256(&pubkey);

        let element = build_reference(&hash, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        // Unresolvable reference fails closed.
        assert!(!verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sighash,
            &hash,
        ));

        // Same spend passes once the registry knows the key.
        let lookup = MapLookup(HashMap::from([(hash, pubkey)]));
        assert!(verify_quantum_transaction(&lookup, &witness, &sighash, &hash));
    }

    #[test]
    fn wrong_program_rejected() {
        let sighash = sha256(b"spend");
        let (pubkey, signature) = signed_keypair(&sighash);

        let element = build_registration(&pubkey, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        let wrong_program = sha256(b"some other key");
        assert!(!verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sighash,
            &wrong_program,
        ));
    }

    #[test]
    fn wrong_sighash_rejected() {
        let sighash = sha256(b"spend");
        let (pubkey, signature) = signed_keypair(&sighash);
        let program = sha256(&pubkey);

        let element = build_registration(&pubkey, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        assert!(!verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sha256(b"a different spend"),
            &program,
        ));
    }
}
