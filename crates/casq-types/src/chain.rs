//! # Chain Data
//!
//! Minimal block and transaction shapes. The quantum subsystem only ever
//! inspects witness stacks, so these types carry exactly that and nothing
//! from the wider validation pipeline.

use serde::{Deserialize, Serialize};

/// A segwit-style witness stack: zero or more byte vectors per input.
///
/// The quantum subsystem interprets only the first stack element.
pub type WitnessStack = Vec<Vec<u8>>;

/// A transaction input, reduced to its witness.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TxInput {
    /// The witness stack attached to this input (empty when non-segwit).
    pub witness: WitnessStack,
}

/// A transaction, reduced to its inputs.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction inputs in order.
    pub inputs: Vec<TxInput>,
}

impl Transaction {
    /// Whether any input carries witness data.
    pub fn has_witness(&self) -> bool {
        self.inputs.iter().any(|input| !input.witness.is_empty())
    }
}

/// A block, reduced to its height and transactions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    /// Block height in the active chain.
    pub height: u64,
    /// Transactions in block order.
    pub transactions: Vec<Transaction>,
}
