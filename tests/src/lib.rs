//! # casq Test Suite
//!
//! Unified test crate for cross-crate flows the per-crate unit tests
//! cannot cover:
//!
//! ```text
//! tests/src/integration/
//! ├── quantum_flow.rs      # register → reference spend end to end
//! ├── addresses.rs         # key → address → program round trips
//! └── registry_rebuild.rs  # rebuild vs incremental equivalence
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p casq-tests
//! cargo test -p casq-tests integration::quantum_flow
//! ```

#![allow(unused_imports)]

pub mod integration;
