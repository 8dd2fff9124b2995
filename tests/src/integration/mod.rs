//! Cross-crate integration tests.

pub mod addresses;
pub mod quantum_flow;
pub mod registry_rebuild;
