//! # Address Round Trips
//!
//! Keys generated by `casq-crypto` must encode to addresses whose decoded
//! program matches the key's hash, on every network, and never decode as
//! valid on any other network.

#[cfg(test)]
mod tests {
    use casq_address::{decode_address, encode_quantum_address, is_quantum_address};
    use casq_crypto::CasqKey;
    use casq_types::ChainParams;

    #[test]
    fn generated_key_round_trips_on_every_network() {
        let key = CasqKey::generate_quantum();
        let pubkey = key.public_key();

        for params in [
            ChainParams::main(),
            ChainParams::test(),
            ChainParams::regtest(),
        ] {
            let address = encode_quantum_address(&pubkey, &params).unwrap();
            assert!(is_quantum_address(&address, &params), "{address}");

            let decoded = decode_address(&address, &params);
            assert!(decoded.is_valid);
            assert!(decoded.is_quantum);
            assert_eq!(decoded.program, pubkey.quantum_id());
        }
    }

    #[test]
    fn address_is_rejected_on_every_other_network() {
        let key = CasqKey::generate_quantum();
        let pubkey = key.public_key();

        let networks = [
            ChainParams::main(),
            ChainParams::test(),
            ChainParams::regtest(),
        ];
        for home in &networks {
            let address = encode_quantum_address(&pubkey, home).unwrap();
            for other in &networks {
                if other.network == home.network {
                    continue;
                }
                assert!(
                    !decode_address(&address, other).is_valid,
                    "{address} accepted on {:?}",
                    other.network
                );
            }
        }
    }

    #[test]
    fn classical_key_cannot_be_encoded() {
        let key = CasqKey::generate_classical(true);
        let pubkey = key.public_key();
        assert!(encode_quantum_address(&pubkey, &ChainParams::main()).is_err());
    }

    #[test]
    fn address_survives_uppercasing() {
        let key = CasqKey::generate_quantum();
        let params = ChainParams::test();
        let address = encode_quantum_address(&key.public_key(), &params).unwrap();

        let decoded = decode_address(&address.to_uppercase(), &params);
        assert!(decoded.is_valid);
        assert_eq!(decoded.program, key.public_key().quantum_id());
    }
}
