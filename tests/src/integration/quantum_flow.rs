//! # Quantum Spend Flow
//!
//! The full lifecycle of a quantum key: generate, derive the address
//! program, spend once with a registration witness (which teaches the
//! registry the key), then spend again with a compact reference witness
//! that resolves through the registry.

#[cfg(test)]
mod tests {
    use casq_consensus::witness::{build_reference, build_registration};
    use casq_consensus::{
        parse_witness, verify_quantum_transaction, DisabledPubkeyLookup, PubkeyLookup,
    };
    use casq_crypto::CasqKey;
    use casq_registry::{InMemoryKVStore, PubkeyRegistry};
    use casq_types::sha256;

    fn registry() -> PubkeyRegistry<InMemoryKVStore> {
        PubkeyRegistry::new(InMemoryKVStore::new())
    }

    #[test]
    fn register_then_reference_spend() {
        let key = CasqKey::generate_quantum();
        assert!(key.is_valid());
        let pubkey = key.public_key();
        let program = pubkey.quantum_id();

        let registry = registry();

        // First spend: registration witness carries the full key.
        let sighash1 = sha256(b"first spend");
        let signature1 = key.sign(&sighash1, 0).unwrap();
        let element = build_registration(pubkey.as_bytes(), &signature1).unwrap();
        let witness1 = parse_witness(&[element]).unwrap();

        assert!(verify_quantum_transaction(
            &registry, &witness1, &sighash1, &program,
        ));

        // The node registers the key when it accepts the block.
        registry.register(pubkey.as_bytes()).unwrap();

        // Second spend: only the 32-byte hash travels.
        let sighash2 = sha256(b"second spend");
        let signature2 = key.sign(&sighash2, 0).unwrap();
        let element = build_reference(&program, &signature2).unwrap();
        let witness2 = parse_witness(&[element]).unwrap();

        assert!(verify_quantum_transaction(
            &registry, &witness2, &sighash2, &program,
        ));
    }

    #[test]
    fn reference_spend_fails_without_registration() {
        let key = CasqKey::generate_quantum();
        let program = key.public_key().quantum_id();

        let sighash = sha256(b"orphan spend");
        let signature = key.sign(&sighash, 0).unwrap();
        let element = build_reference(&program, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        // Empty registry: the hash resolves to nothing.
        assert!(!verify_quantum_transaction(
            &registry(),
            &witness,
            &sighash,
            &program,
        ));

        // Same failure when the registry is disabled entirely.
        assert!(!verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sighash,
            &program,
        ));
    }

    #[test]
    fn registration_spend_needs_no_registry() {
        let key = CasqKey::generate_quantum();
        let pubkey = key.public_key();

        let sighash = sha256(b"bootstrap spend");
        let signature = key.sign(&sighash, 0).unwrap();
        let element = build_registration(pubkey.as_bytes(), &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();

        assert!(verify_quantum_transaction(
            &DisabledPubkeyLookup,
            &witness,
            &sighash,
            &pubkey.quantum_id(),
        ));
    }

    #[test]
    fn spend_with_wrong_key_rejected() {
        let owner = CasqKey::generate_quantum();
        let thief = CasqKey::generate_quantum();
        let program = owner.public_key().quantum_id();

        let registry = registry();
        registry.register(owner.public_key().as_bytes()).unwrap();
        registry.register(thief.public_key().as_bytes()).unwrap();

        let sighash = sha256(b"theft attempt");
        let signature = thief.sign(&sighash, 0).unwrap();

        // Thief references their own (registered) key: program mismatch.
        let element = build_reference(&thief.public_key().quantum_id(), &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();
        assert!(!verify_quantum_transaction(
            &registry, &witness, &sighash, &program,
        ));

        // Thief references the owner's key: signature mismatch.
        let element = build_reference(&program, &signature).unwrap();
        let witness = parse_witness(&[element]).unwrap();
        assert!(!verify_quantum_transaction(
            &registry, &witness, &sighash, &program,
        ));
    }

    #[test]
    fn registry_resolves_exactly_what_was_registered() {
        let key = CasqKey::generate_quantum();
        let pubkey = key.public_key();

        let registry = registry();
        let hash = registry.register(pubkey.as_bytes()).unwrap();

        let resolved = registry.lookup_pubkey(&hash).unwrap();
        assert_eq!(resolved, pubkey.as_bytes());
    }
}
