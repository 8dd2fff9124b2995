//! # casq-registry — On-Chain Public Key Registry
//!
//! Stores every FALCON-512 public key seen in a registration witness,
//! keyed by SHA-256 hash, so later spends can reference keys by hash and
//! keep witnesses small.
//!
//! ## Architecture
//!
//! - **Ports** (`ports`): `KeyValueStore` and `BlockSource` traits the
//!   host wires in, plus in-memory implementations for tests
//! - **Adapters** (`adapters`): production RocksDB store
//! - **Service** (`service`): the registry itself — LRU-cached lookups,
//!   idempotent registration, integrity-checked reads, destructive rebuild
//!
//! The registry implements [`casq_consensus::PubkeyLookup`], so a handle
//! plugs straight into transaction verification.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod errors;
pub mod ports;
pub mod service;

pub use errors::{KVStoreError, RegistryError};
pub use ports::{BlockSource, InMemoryBlockSource, InMemoryKVStore, KeyValueStore};
pub use service::{PubkeyRegistry, RegistryStats, DB_PREFIX};

#[cfg(feature = "rocksdb")]
pub use adapters::rocksdb::{RocksDbConfig, RocksDbStore};
