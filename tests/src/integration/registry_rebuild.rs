//! # Registry Rebuild Equivalence
//!
//! A registry rebuilt from the chain must end up with exactly the key set
//! an always-online node accumulated incrementally, regardless of what was
//! in the store beforehand.

#[cfg(test)]
mod tests {
    use casq_consensus::witness::build_registration;
    use casq_consensus::{parse_witness, QuantumWitness};
    use casq_registry::{InMemoryBlockSource, InMemoryKVStore, PubkeyRegistry};
    use casq_types::{sha256, Block, Hash, Transaction, TxInput};

    const KEY_SIZE: usize = 897;

    fn fake_pubkey(seed: u8) -> Vec<u8> {
        vec![seed; KEY_SIZE]
    }

    /// A small chain: some blocks empty, some with registrations, one key
    /// registered twice, and one non-quantum witness mixed in.
    fn test_chain() -> Vec<Block> {
        let reg = |seed: u8| TxInput {
            witness: vec![build_registration(&fake_pubkey(seed), &[0xcc; 80]).unwrap()],
        };
        vec![
            Block {
                height: 0,
                transactions: vec![],
            },
            Block {
                height: 1,
                transactions: vec![Transaction {
                    inputs: vec![reg(0x01), reg(0x02)],
                }],
            },
            Block {
                height: 2,
                transactions: vec![Transaction {
                    inputs: vec![TxInput {
                        witness: vec![vec![0xde, 0xad]],
                    }],
                }],
            },
            Block {
                height: 3,
                transactions: vec![
                    Transaction {
                        inputs: vec![reg(0x03)],
                    },
                    // Same key as block 1: must stay idempotent.
                    Transaction {
                        inputs: vec![reg(0x01)],
                    },
                ],
            },
        ]
    }

    fn registered_hashes(chain: &[Block]) -> Vec<Hash> {
        let mut hashes = Vec::new();
        for block in chain {
            for tx in &block.transactions {
                for input in &tx.inputs {
                    if let Ok(QuantumWitness::Registration { pubkey, .. }) =
                        parse_witness(&input.witness)
                    {
                        hashes.push(sha256(&pubkey));
                    }
                }
            }
        }
        hashes
    }

    #[test]
    fn rebuild_matches_incremental_processing() {
        let chain = test_chain();

        // Incremental node: registers keys as blocks arrive.
        let incremental = PubkeyRegistry::new(InMemoryKVStore::new());
        for block in &chain {
            for tx in &block.transactions {
                for input in &tx.inputs {
                    if let Ok(QuantumWitness::Registration { pubkey, .. }) =
                        parse_witness(&input.witness)
                    {
                        incremental.register(&pubkey).unwrap();
                    }
                }
            }
        }

        // Recovering node: rebuilds over the same range, starting from a
        // store polluted with a key the chain never registered.
        let rebuilt = PubkeyRegistry::new(InMemoryKVStore::new());
        let stale = rebuilt.register(&fake_pubkey(0xff)).unwrap();

        let source = InMemoryBlockSource::new(chain.clone());
        rebuilt.rebuild(&source, 0, 3).unwrap();

        assert!(!rebuilt.is_registered(&stale));
        for hash in registered_hashes(&chain) {
            assert_eq!(
                incremental.lookup(&hash),
                rebuilt.lookup(&hash),
                "registries disagree on {}",
                hex::encode(hash)
            );
            assert!(rebuilt.is_registered(&hash));
        }

        let a = incremental.stats().unwrap();
        let b = rebuilt.stats().unwrap();
        assert_eq!(a.total_keys, b.total_keys);
        assert_eq!(a.total_keys, 3);
    }

    #[test]
    fn rebuild_is_repeatable() {
        let chain = test_chain();
        let source = InMemoryBlockSource::new(chain);
        let registry = PubkeyRegistry::new(InMemoryKVStore::new());

        let first = registry.rebuild(&source, 0, 3).unwrap();
        let second = registry.rebuild(&source, 0, 3).unwrap();

        // Same registrations found both times, and no duplicates left over.
        assert_eq!(first, second);
        assert_eq!(registry.stats().unwrap().total_keys, 3);
    }
}
