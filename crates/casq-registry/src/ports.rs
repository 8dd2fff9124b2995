//! # Outbound Ports
//!
//! Dependencies the registry requires the host to wire in.
//!
//! Production: `RocksDbStore` (`adapters/rocksdb.rs`) and the node's block
//! index. Testing: the in-memory implementations below.

use std::collections::BTreeMap;

use casq_types::Block;

use crate::errors::KVStoreError;

/// Abstract interface for ordered key-value database operations.
pub trait KeyValueStore: Send + Sync {
    /// Get a value by key.
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError>;

    /// Put a key-value pair. With `sync` set, the write is durable before
    /// this returns.
    fn put(&mut self, key: &[u8], value: &[u8], sync: bool) -> Result<(), KVStoreError>;

    /// Delete a key.
    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError>;

    /// Check if a key exists.
    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError>;

    /// Flush buffered writes to durable storage.
    fn sync(&mut self) -> Result<(), KVStoreError>;

    /// Iterate over all entries whose key starts with `prefix`.
    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError>;

    /// Approximate on-disk size of the key range under `prefix`.
    fn estimate_size(&self, prefix: &[u8]) -> Result<u64, KVStoreError>;
}

/// Provides blocks by height for registry rebuild.
pub trait BlockSource {
    /// The block at `height`, or `None` when not available.
    fn block_at(&self, height: u64) -> Option<Block>;
}

/// In-memory key-value store for unit tests.
#[derive(Default)]
pub struct InMemoryKVStore {
    data: BTreeMap<Vec<u8>, Vec<u8>>,
}

impl InMemoryKVStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl KeyValueStore for InMemoryKVStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &[u8], value: &[u8], _sync: bool) -> Result<(), KVStoreError> {
        self.data.insert(key.to_vec(), value.to_vec());
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.data.remove(key);
        Ok(())
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        Ok(self.data.contains_key(key))
    }

    fn sync(&mut self) -> Result<(), KVStoreError> {
        Ok(())
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        Ok(self
            .data
            .range(prefix.to_vec()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn estimate_size(&self, prefix: &[u8]) -> Result<u64, KVStoreError> {
        Ok(self
            .prefix_scan(prefix)?
            .iter()
            .map(|(k, v)| (k.len() + v.len()) as u64)
            .sum())
    }
}

/// Block source over a fixed list of blocks, for tests.
#[derive(Default)]
pub struct InMemoryBlockSource {
    blocks: BTreeMap<u64, Block>,
}

impl InMemoryBlockSource {
    /// Build a source from blocks carrying their own heights.
    pub fn new(blocks: impl IntoIterator<Item = Block>) -> Self {
        Self {
            blocks: blocks.into_iter().map(|b| (b.height, b)).collect(),
        }
    }
}

impl BlockSource for InMemoryBlockSource {
    fn block_at(&self, height: u64) -> Option<Block> {
        self.blocks.get(&height).cloned()
    }
}
