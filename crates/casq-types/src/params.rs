//! # Chain Parameters
//!
//! Network identification and the per-network constants the quantum
//! subsystem depends on: bech32 prefixes and the activation height.

use serde::{Deserialize, Serialize};

/// Identifies which chain a node is running on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NetworkId {
    /// Production network.
    Main,
    /// Public test network.
    Test,
    /// Local regression-test network.
    Regtest,
}

/// Chain parameters consumed by address encoding and registry rebuild.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainParams {
    /// Which network these parameters describe.
    pub network: NetworkId,
    /// Bech32 HRP for standard (non-quantum) witness addresses.
    pub bech32_hrp: &'static str,
    /// Block height at which quantum transactions activate.
    pub quantum_activation_height: u64,
}

impl ChainParams {
    /// Mainnet parameters.
    pub fn main() -> Self {
        Self {
            network: NetworkId::Main,
            bech32_hrp: "cas",
            quantum_activation_height: 250_000,
        }
    }

    /// Testnet parameters.
    pub fn test() -> Self {
        Self {
            network: NetworkId::Test,
            bech32_hrp: "tcas",
            quantum_activation_height: 0,
        }
    }

    /// Regtest parameters.
    pub fn regtest() -> Self {
        Self {
            network: NetworkId::Regtest,
            bech32_hrp: "rcas",
            quantum_activation_height: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_hrps_are_distinct() {
        let hrps = [
            ChainParams::main().bech32_hrp,
            ChainParams::test().bech32_hrp,
            ChainParams::regtest().bech32_hrp,
        ];
        assert_eq!(hrps.len(), 3);
        assert_ne!(hrps[0], hrps[1]);
        assert_ne!(hrps[1], hrps[2]);
    }
}
