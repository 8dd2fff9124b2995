//! # Quantum Addresses
//!
//! A quantum address commits to SHA-256 of a FALCON-512 public key behind
//! witness version 2, under a network-specific HRP distinct from the
//! standard segwit-style HRP. Decoding routes on the HRP: quantum HRPs get
//! strict v2/Bech32m/32-byte checks plus cross-network rejection, standard
//! HRPs get the general witness-version rule, anything else is invalid.

use sha2::{Digest, Sha256};
use tracing::debug;

use casq_crypto::{falcon, CasqPublicKey};
use casq_types::{ChainParams, NetworkId};

use crate::bech32::{self, convert_bits, Encoding};

/// Witness version reserved for quantum programs.
pub const WITNESS_VERSION_QUANTUM: u8 = 2;
/// Quantum witness program size: SHA-256 of the public key.
pub const QUANTUM_PROGRAM_SIZE: usize = 32;

/// Mainnet quantum HRP.
const HRP_MAIN: &str = "casq";
/// Testnet quantum HRP.
const HRP_TEST: &str = "tcasq";
/// Regtest quantum HRP.
const HRP_REGTEST: &str = "rcasq";

/// Errors from quantum address encoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AddressError {
    /// The supplied key is not a quantum public key.
    #[error("not a quantum public key")]
    NotQuantumKey,
    /// The supplied key bytes have the wrong length.
    #[error("invalid quantum public key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },
}

/// Outcome of a type-detecting address decode.
///
/// `is_valid == false` with `witness_version == None` means the string was
/// not bech32 at all, which callers treat as "try the legacy base58 path"
/// rather than as a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAddress {
    /// Whether the address is valid for the caller's network.
    pub is_valid: bool,
    /// Whether the address is a quantum (v2, quantum-HRP) address.
    pub is_quantum: bool,
    /// Witness version, when the string decoded as bech32 at all.
    pub witness_version: Option<u8>,
    /// Witness program bytes (empty unless decode succeeded).
    pub program: Vec<u8>,
    /// The HRP the string carried, lowercased (empty when not bech32).
    pub hrp: String,
}

impl DecodedAddress {
    fn not_bech32() -> Self {
        DecodedAddress {
            is_valid: false,
            is_quantum: false,
            witness_version: None,
            program: Vec::new(),
            hrp: String::new(),
        }
    }

    fn invalid(hrp: String, version: u8, program: Vec<u8>) -> Self {
        DecodedAddress {
            is_valid: false,
            is_quantum: false,
            witness_version: Some(version),
            program,
            hrp,
        }
    }
}

/// The quantum HRP for a network. Unknown networks fall back to mainnet.
pub fn quantum_hrp(network: NetworkId) -> &'static str {
    match network {
        NetworkId::Main => HRP_MAIN,
        NetworkId::Test => HRP_TEST,
        NetworkId::Regtest => HRP_REGTEST,
    }
}

/// Encode a quantum public key as a v2 Bech32m address for `params`'
/// network: program = SHA-256(key).
pub fn encode_quantum_address(
    pubkey: &CasqPublicKey,
    params: &ChainParams,
) -> Result<String, AddressError> {
    if !pubkey.is_quantum() {
        return Err(AddressError::NotQuantumKey);
    }
    encode_quantum_address_bytes(pubkey.as_bytes(), params)
}

/// Encode raw FALCON-512 public key bytes as a quantum address.
pub fn encode_quantum_address_bytes(
    pubkey: &[u8],
    params: &ChainParams,
) -> Result<String, AddressError> {
    if pubkey.len() != falcon::PUBLIC_KEY_SIZE {
        return Err(AddressError::InvalidKeyLength {
            expected: falcon::PUBLIC_KEY_SIZE,
            actual: pubkey.len(),
        });
    }

    let program: [u8; QUANTUM_PROGRAM_SIZE] = Sha256::digest(pubkey).into();

    let mut data = vec![WITNESS_VERSION_QUANTUM];
    // Never fails for 8->5 with padding.
    data.extend(convert_bits(&program, 8, 5, true).unwrap_or_default());

    Ok(bech32::encode(
        quantum_hrp(params.network),
        &data,
        Encoding::Bech32m,
    ))
}

/// Decode an address string and classify it for `params`' network.
///
/// Routing:
/// 1. Not bech32 under either checksum constant: returns the non-error
///    "not bech32" result so the caller can try its legacy decoder.
/// 2. Quantum HRP: valid iff Bech32m, witness version 2, 32-byte program,
///    and the HRP belongs to the caller's own network.
/// 3. The network's standard HRP: v0 must be Bech32, v1..=16 must be
///    Bech32m.
/// 4. Any other HRP: invalid.
pub fn decode_address(address: &str, params: &ChainParams) -> DecodedAddress {
    let Some(decoded) = bech32::decode(address) else {
        return DecodedAddress::not_bech32();
    };
    if decoded.data.is_empty() {
        return DecodedAddress::not_bech32();
    }

    let version = decoded.data[0];
    // The string passed the checksum, so a payload that cannot be repacked
    // is a malformed witness address, not a legacy base58 candidate.
    let Some(program) = convert_bits(&decoded.data[1..], 5, 8, false) else {
        debug!(hrp = %decoded.hrp, version, "bech32 payload with invalid bit packing");
        return DecodedAddress::invalid(decoded.hrp, version, Vec::new());
    };

    let is_quantum_hrp =
        matches!(decoded.hrp.as_str(), HRP_MAIN | HRP_TEST | HRP_REGTEST);

    if is_quantum_hrp {
        if decoded.hrp != quantum_hrp(params.network) {
            debug!(
                hrp = %decoded.hrp,
                network = ?params.network,
                "quantum address rejected: wrong network"
            );
            return DecodedAddress::invalid(decoded.hrp, version, program);
        }
        let well_formed = decoded.encoding == Encoding::Bech32m
            && version == WITNESS_VERSION_QUANTUM
            && program.len() == QUANTUM_PROGRAM_SIZE;
        if !well_formed {
            debug!(
                hrp = %decoded.hrp,
                version,
                program_len = program.len(),
                "malformed quantum address"
            );
            return DecodedAddress::invalid(decoded.hrp, version, program);
        }
        return DecodedAddress {
            is_valid: true,
            is_quantum: true,
            witness_version: Some(version),
            program,
            hrp: decoded.hrp,
        };
    }

    if decoded.hrp == params.bech32_hrp {
        let version_ok = match version {
            0 => decoded.encoding == Encoding::Bech32,
            1..=16 => decoded.encoding == Encoding::Bech32m,
            _ => false,
        };
        if !version_ok || program.is_empty() {
            return DecodedAddress::invalid(decoded.hrp, version, program);
        }
        return DecodedAddress {
            is_valid: true,
            is_quantum: false,
            witness_version: Some(version),
            program,
            hrp: decoded.hrp,
        };
    }

    debug!(hrp = %decoded.hrp, "address with unknown HRP");
    DecodedAddress::invalid(decoded.hrp, version, program)
}

/// Whether `address` is a valid quantum address for `params`' network.
pub fn is_quantum_address(address: &str, params: &ChainParams) -> bool {
    let decoded = decode_address(address, params);
    decoded.is_valid && decoded.is_quantum
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_key() -> Vec<u8> {
        vec![0x01; falcon::PUBLIC_KEY_SIZE]
    }

    #[test]
    fn encode_testnet_key() {
        let params = ChainParams::test();
        let address = encode_quantum_address_bytes(&test_key(), &params).unwrap();
        assert!(address.starts_with("tcasq1"));

        let decoded = decode_address(&address, &params);
        assert!(decoded.is_valid);
        assert!(decoded.is_quantum);
        assert_eq!(decoded.witness_version, Some(WITNESS_VERSION_QUANTUM));
        let expected: [u8; 32] = Sha256::digest(test_key()).into();
        assert_eq!(decoded.program, expected);
    }

    #[test]
    fn each_network_gets_its_hrp() {
        for (params, prefix) in [
            (ChainParams::main(), "casq1"),
            (ChainParams::test(), "tcasq1"),
            (ChainParams::regtest(), "rcasq1"),
        ] {
            let address = encode_quantum_address_bytes(&test_key(), &params).unwrap();
            assert!(address.starts_with(prefix), "{address}");
            assert!(is_quantum_address(&address, &params));
        }
    }

    #[test]
    fn cross_network_address_rejected() {
        let mainnet_address =
            encode_quantum_address_bytes(&test_key(), &ChainParams::main()).unwrap();
        let decoded = decode_address(&mainnet_address, &ChainParams::test());
        assert!(!decoded.is_valid);
        // Recognized as bech32, just not for this network.
        assert_eq!(decoded.witness_version, Some(WITNESS_VERSION_QUANTUM));
    }

    #[test]
    fn wrong_key_length_rejected() {
        let err = encode_quantum_address_bytes(&[0u8; 100], &ChainParams::main()).unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidKeyLength {
                expected: falcon::PUBLIC_KEY_SIZE,
                actual: 100,
            }
        );
    }

    #[test]
    fn quantum_hrp_with_bech32_checksum_invalid() {
        let program: [u8; 32] = Sha256::digest(test_key()).into();
        let mut data = vec![WITNESS_VERSION_QUANTUM];
        data.extend(convert_bits(&program, 8, 5, true).unwrap());
        let address = bech32::encode("casq", &data, Encoding::Bech32);
        assert!(!decode_address(&address, &ChainParams::main()).is_valid);
    }

    #[test]
    fn quantum_hrp_with_wrong_version_invalid() {
        let program: [u8; 32] = Sha256::digest(test_key()).into();
        let mut data = vec![1u8];
        data.extend(convert_bits(&program, 8, 5, true).unwrap());
        let address = bech32::encode("casq", &data, Encoding::Bech32m);
        assert!(!decode_address(&address, &ChainParams::main()).is_valid);
    }

    #[test]
    fn standard_hrp_version_rules() {
        let params = ChainParams::main();
        let program = [0x42u8; 20];
        let mut v0 = vec![0u8];
        v0.extend(convert_bits(&program, 8, 5, true).unwrap());

        // v0 must be Bech32.
        let good = bech32::encode(params.bech32_hrp, &v0, Encoding::Bech32);
        let decoded = decode_address(&good, &params);
        assert!(decoded.is_valid);
        assert!(!decoded.is_quantum);
        assert_eq!(decoded.witness_version, Some(0));

        let bad = bech32::encode(params.bech32_hrp, &v0, Encoding::Bech32m);
        assert!(!decode_address(&bad, &params).is_valid);

        // v1 must be Bech32m.
        let mut v1 = vec![1u8];
        v1.extend(convert_bits(&program, 8, 5, true).unwrap());
        let good = bech32::encode(params.bech32_hrp, &v1, Encoding::Bech32m);
        assert!(decode_address(&good, &params).is_valid);
        let bad = bech32::encode(params.bech32_hrp, &v1, Encoding::Bech32);
        assert!(!decode_address(&bad, &params).is_valid);
    }

    #[test]
    fn unknown_hrp_invalid() {
        let address = bech32::encode("bc", &[0, 1, 2, 3, 4, 5, 6, 7], Encoding::Bech32);
        let decoded = decode_address(&address, &ChainParams::main());
        assert!(!decoded.is_valid);
        assert!(decoded.witness_version.is_some());
    }

    #[test]
    fn unpackable_payload_is_invalid_not_legacy() {
        // A single 5-bit group after the version leaves nonzero padding, so
        // 5->8 repacking fails. The checksum is fine, so this must come back
        // as an invalid witness address rather than "try base58".
        let address = bech32::encode("casq", &[2, 0x1f], Encoding::Bech32m);
        let decoded = decode_address(&address, &ChainParams::main());
        assert!(!decoded.is_valid);
        assert_eq!(decoded.witness_version, Some(2));
    }

    #[test]
    fn non_bech32_is_not_an_error() {
        let decoded = decode_address("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", &ChainParams::main());
        assert!(!decoded.is_valid);
        assert!(decoded.witness_version.is_none());
    }
}
