//! Production adapters for the outbound ports.

#[cfg(feature = "rocksdb")]
pub mod rocksdb;
