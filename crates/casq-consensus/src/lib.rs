//! # casq-consensus — Quantum Transaction Validation
//!
//! The consensus-facing surface of the quantum subsystem:
//!
//! | Module | Contents |
//! |--------|----------|
//! | `witness` | Wire codec for the two quantum witness forms |
//! | `verify` | Transaction verification against a pubkey lookup port |
//! | `ownership` | Wallet-side witness-program to keystore matching |
//!
//! Verification collapses every failure to a single boolean so block
//! validation cannot branch on the reason a spend was rejected. The
//! reasons are still logged distinctly for diagnostics.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod errors;
pub mod ownership;
pub mod verify;
pub mod witness;

pub use errors::WitnessError;
pub use ownership::{has_spending_key, reverse_program};
pub use verify::{verify_quantum_transaction, DisabledPubkeyLookup, PubkeyLookup};
pub use witness::{
    parse_witness, QuantumWitness, MARKER_REFERENCE, MARKER_REGISTRATION, MAX_SIGNATURE_SIZE,
};
