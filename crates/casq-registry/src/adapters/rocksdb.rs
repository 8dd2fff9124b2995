//! # RocksDB Storage Adapter
//!
//! Production implementation of the `KeyValueStore` port, rooted at
//! `<datadir>/quantum_pubkeys`. The database holds nothing but registry
//! entries, so no column families are needed.
//!
//! Tuned for the registry's access pattern: small values (897 bytes),
//! point lookups dominate, writes are rare and must be durable.

use std::path::Path;

use rocksdb::{IteratorMode, Options, WriteOptions, DB};

use crate::errors::KVStoreError;
use crate::ports::KeyValueStore;

/// RocksDB configuration for the registry store.
#[derive(Debug, Clone)]
pub struct RocksDbConfig {
    /// Path to the database directory.
    pub path: String,
    /// Block cache size in bytes (default: 32MB).
    pub block_cache_size: usize,
    /// Write buffer size in bytes (default: 8MB).
    pub write_buffer_size: usize,
    /// Default sync behavior for writes that do not request it explicitly.
    pub sync_writes: bool,
}

impl Default for RocksDbConfig {
    fn default() -> Self {
        Self {
            path: "./data/quantum_pubkeys".to_string(),
            block_cache_size: 32 * 1024 * 1024,
            write_buffer_size: 8 * 1024 * 1024,
            sync_writes: true,
        }
    }
}

impl RocksDbConfig {
    /// Config for tests: small buffers, no fsync.
    pub fn for_testing(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            block_cache_size: 4 * 1024 * 1024,
            write_buffer_size: 1024 * 1024,
            sync_writes: false,
        }
    }
}

/// RocksDB-backed key-value store.
pub struct RocksDbStore {
    db: DB,
    config: RocksDbConfig,
}

impl RocksDbStore {
    /// Open or create the database described by `config`.
    pub fn open(config: RocksDbConfig) -> Result<Self, KVStoreError> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.set_write_buffer_size(config.write_buffer_size);
        opts.set_compression_type(rocksdb::DBCompressionType::Snappy);

        let mut block_opts = rocksdb::BlockBasedOptions::default();
        block_opts.set_bloom_filter(10.0, false);
        block_opts.set_block_cache(&rocksdb::Cache::new_lru_cache(config.block_cache_size));
        opts.set_block_based_table_factory(&block_opts);

        let db = DB::open(&opts, &config.path).map_err(|e| KVStoreError::Io {
            message: format!("failed to open RocksDB: {e}"),
        })?;

        Ok(Self { db, config })
    }

    /// Open at `path` with default settings.
    pub fn open_default(path: impl AsRef<Path>) -> Result<Self, KVStoreError> {
        Self::open(RocksDbConfig {
            path: path.as_ref().to_string_lossy().to_string(),
            ..Default::default()
        })
    }
}

impl KeyValueStore for RocksDbStore {
    fn get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, KVStoreError> {
        self.db.get(key).map_err(|e| KVStoreError::Io {
            message: format!("RocksDB get failed: {e}"),
        })
    }

    fn put(&mut self, key: &[u8], value: &[u8], sync: bool) -> Result<(), KVStoreError> {
        let mut write_opts = WriteOptions::default();
        write_opts.set_sync(sync || self.config.sync_writes);
        self.db
            .put_opt(key, value, &write_opts)
            .map_err(|e| KVStoreError::Io {
                message: format!("RocksDB put failed: {e}"),
            })
    }

    fn delete(&mut self, key: &[u8]) -> Result<(), KVStoreError> {
        self.db.delete(key).map_err(|e| KVStoreError::Io {
            message: format!("RocksDB delete failed: {e}"),
        })
    }

    fn exists(&self, key: &[u8]) -> Result<bool, KVStoreError> {
        self.db
            .get_pinned(key)
            .map(|v| v.is_some())
            .map_err(|e| KVStoreError::Io {
                message: format!("RocksDB exists check failed: {e}"),
            })
    }

    fn sync(&mut self) -> Result<(), KVStoreError> {
        self.db.flush().map_err(|e| KVStoreError::Io {
            message: format!("RocksDB flush failed: {e}"),
        })
    }

    fn prefix_scan(&self, prefix: &[u8]) -> Result<Vec<(Vec<u8>, Vec<u8>)>, KVStoreError> {
        let mut results = Vec::new();
        let iter = self
            .db
            .iterator(IteratorMode::From(prefix, rocksdb::Direction::Forward));

        for item in iter {
            match item {
                Ok((key, value)) => {
                    if !key.starts_with(prefix) {
                        break;
                    }
                    results.push((key.to_vec(), value.to_vec()));
                }
                Err(e) => {
                    return Err(KVStoreError::Io {
                        message: format!("RocksDB scan failed: {e}"),
                    });
                }
            }
        }

        Ok(results)
    }

    fn estimate_size(&self, _prefix: &[u8]) -> Result<u64, KVStoreError> {
        // The database is dedicated to the registry, so the live-data
        // estimate covers exactly the prefixed range.
        self.db
            .property_int_value("rocksdb.estimate-live-data-size")
            .map(|v| v.unwrap_or(0))
            .map_err(|e| KVStoreError::Io {
                message: format!("RocksDB property read failed: {e}"),
            })
    }
}
