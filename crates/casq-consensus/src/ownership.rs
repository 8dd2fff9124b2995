//! # Ownership Matching
//!
//! Wallet-side check: does any key in the keystore derive a given witness
//! program? Early builds wrote the program to disk in the opposite byte
//! order, so the match accepts either orientation until those wallets have
//! been migrated.

use tracing::trace;

use casq_crypto::CasqPublicKey;
use casq_types::Hash;

/// The byte-reversed form of a witness program.
///
/// Programs written by pre-migration wallets are stored reversed; this is
/// the normalization the matcher applies before its second comparison.
pub fn reverse_program(program: &Hash) -> Hash {
    let mut reversed = *program;
    reversed.reverse();
    reversed
}

/// Whether any quantum key among `keys` derives `program`.
///
/// Matches against the program as given and its byte-reversed form. The
/// dual check is a migration shim for data written in the old byte order.
pub fn has_spending_key(program: &Hash, keys: &[CasqPublicKey]) -> bool {
    let reversed = reverse_program(program);
    for key in keys {
        if !key.is_quantum() {
            continue;
        }
        let id = key.quantum_id();
        if id == *program || id == reversed {
            trace!(reversed = (id == reversed), "found spending key for program");
            return true;
        }
    }
    false
}
