//! # Registry Service
//!
//! LRU-cached, integrity-checked key registry over a generic key-value
//! store. Every entry is keyed by a one-byte prefix plus the SHA-256 hash
//! of the key it stores; the value is the raw 897-byte public key.
//!
//! The cache, its counters, and the store are guarded by one mutex: two
//! threads racing on the same hash observe either the original value or a
//! cleanly completed write, never a torn one.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use tracing::{debug, error, info, warn};

use casq_consensus::{parse_witness, PubkeyLookup, QuantumWitness};
use casq_crypto::falcon;
use casq_types::Hash;

use crate::errors::RegistryError;
use crate::ports::{BlockSource, KeyValueStore};

/// Prefix byte for every registry entry in the store.
pub const DB_PREFIX: u8 = b'Q';

/// Maximum number of keys held in the lookup cache.
const CACHE_CAPACITY: usize = 1000;

/// Blocks between progress reports during rebuild.
const REBUILD_PROGRESS_INTERVAL: u64 = 10_000;

/// Registry usage counters and size figures.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RegistryStats {
    /// Total registered keys, counted by a prefix-scoped scan.
    pub total_keys: u64,
    /// Approximate on-disk size of the registry's key range.
    pub estimated_size: u64,
    /// Cumulative cache hits.
    pub cache_hits: u64,
    /// Cumulative cache misses.
    pub cache_misses: u64,
}

/// Bounded most-recently-used cache: hash map index plus recency list.
struct LruCache {
    entries: HashMap<Hash, Vec<u8>>,
    recency: VecDeque<Hash>,
    capacity: usize,
}

impl LruCache {
    fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            recency: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Look up a hash, promoting it to most recently used on a hit.
    fn get(&mut self, hash: &Hash) -> Option<Vec<u8>> {
        let value = self.entries.get(hash)?.clone();
        if let Some(pos) = self.recency.iter().position(|h| h == hash) {
            self.recency.remove(pos);
            self.recency.push_front(*hash);
        }
        Some(value)
    }

    /// Insert at the most-recently-used position, evicting the least
    /// recently used entry when full.
    fn insert(&mut self, hash: Hash, value: Vec<u8>) {
        if self.entries.contains_key(&hash) {
            self.entries.insert(hash, value);
            if let Some(pos) = self.recency.iter().position(|h| *h == hash) {
                self.recency.remove(pos);
            }
            self.recency.push_front(hash);
            return;
        }
        if self.entries.len() >= self.capacity {
            if let Some(evicted) = self.recency.pop_back() {
                self.entries.remove(&evicted);
            }
        }
        self.entries.insert(hash, value);
        self.recency.push_front(hash);
    }

    fn contains(&self, hash: &Hash) -> bool {
        self.entries.contains_key(hash)
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.recency.clear();
    }
}

struct Inner<KV> {
    store: KV,
    cache: LruCache,
    hits: u64,
    misses: u64,
    last_error: Option<String>,
}

/// The public key registry.
///
/// Generic over its store so tests run in memory and production runs on
/// RocksDB. Implements [`PubkeyLookup`] for the transaction verifier.
pub struct PubkeyRegistry<KV: KeyValueStore> {
    inner: Mutex<Inner<KV>>,
}

fn storage_key(hash: &Hash) -> [u8; 33] {
    let mut key = [0u8; 33];
    key[0] = DB_PREFIX;
    key[1..].copy_from_slice(hash);
    key
}

impl<KV: KeyValueStore> PubkeyRegistry<KV> {
    /// Wrap an opened store.
    pub fn new(store: KV) -> Self {
        Self {
            inner: Mutex::new(Inner {
                store,
                cache: LruCache::new(CACHE_CAPACITY),
                hits: 0,
                misses: 0,
                last_error: None,
            }),
        }
    }

    /// Register a public key under its SHA-256 hash.
    ///
    /// Idempotent: a key already present returns its hash without
    /// rewriting. New keys are written synchronously so registration is
    /// durable before this returns.
    pub fn register(&self, pubkey: &[u8]) -> Result<Hash, RegistryError> {
        if pubkey.len() != falcon::PUBLIC_KEY_SIZE {
            return Err(RegistryError::InvalidKeyLength {
                expected: falcon::PUBLIC_KEY_SIZE,
                actual: pubkey.len(),
            });
        }
        let hash: Hash = Sha256::digest(pubkey).into();

        let mut inner = self.inner.lock();
        Self::register_locked(&mut inner, &hash, pubkey)?;
        Ok(hash)
    }

    fn register_locked(
        inner: &mut Inner<KV>,
        hash: &Hash,
        pubkey: &[u8],
    ) -> Result<(), RegistryError> {
        let key = storage_key(hash);
        match inner.store.exists(&key) {
            Ok(true) => {
                inner.cache.insert(*hash, pubkey.to_vec());
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                inner.last_error = Some(e.to_string());
                return Err(e.into());
            }
        }

        if let Err(e) = inner.store.put(&key, pubkey, true) {
            inner.last_error = Some(e.to_string());
            return Err(e.into());
        }
        inner.cache.insert(*hash, pubkey.to_vec());
        debug!(hash = %hex_prefix(hash), "registered quantum public key");
        Ok(())
    }

    /// Resolve a hash to its registered public key.
    ///
    /// Store reads are integrity-checked: the retrieved bytes are re-hashed
    /// and compared to the requested hash. A mismatch means corruption; the
    /// lookup fails and the bad value is never cached.
    pub fn lookup(&self, hash: &Hash) -> Option<Vec<u8>> {
        let mut inner = self.inner.lock();

        if let Some(pubkey) = inner.cache.get(hash) {
            inner.hits += 1;
            return Some(pubkey);
        }
        inner.misses += 1;

        let value = match inner.store.get(&storage_key(hash)) {
            Ok(Some(value)) => value,
            Ok(None) => return None,
            Err(e) => {
                warn!(error = %e, "registry read failed");
                inner.last_error = Some(e.to_string());
                return None;
            }
        };

        let actual: Hash = Sha256::digest(&value).into();
        if actual != *hash {
            error!(
                requested = %hex_prefix(hash),
                actual = %hex_prefix(&actual),
                "registry entry failed integrity check, treating as corrupt"
            );
            inner.last_error = Some("registry entry hash mismatch".to_string());
            return None;
        }

        inner.cache.insert(*hash, value.clone());
        Some(value)
    }

    /// Whether a key with this hash is registered.
    pub fn is_registered(&self, hash: &Hash) -> bool {
        let mut inner = self.inner.lock();
        if inner.cache.contains(hash) {
            return true;
        }
        match inner.store.exists(&storage_key(hash)) {
            Ok(found) => found,
            Err(e) => {
                inner.last_error = Some(e.to_string());
                false
            }
        }
    }

    /// Current usage counters and size figures.
    pub fn stats(&self) -> Result<RegistryStats, RegistryError> {
        let mut inner = self.inner.lock();
        let total_keys = match inner.store.prefix_scan(&[DB_PREFIX]) {
            Ok(entries) => entries.len() as u64,
            Err(e) => {
                inner.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };
        let estimated_size = inner.store.estimate_size(&[DB_PREFIX])?;
        Ok(RegistryStats {
            total_keys,
            estimated_size,
            cache_hits: inner.hits,
            cache_misses: inner.misses,
        })
    }

    /// Flush buffered writes to durable storage.
    pub fn flush(&self) -> Result<(), RegistryError> {
        let mut inner = self.inner.lock();
        if let Err(e) = inner.store.sync() {
            inner.last_error = Some(e.to_string());
            return Err(e.into());
        }
        Ok(())
    }

    /// The most recent storage or consistency error, if any.
    pub fn last_error(&self) -> Option<String> {
        self.inner.lock().last_error.clone()
    }

    /// Destructive rebuild: wipe every registry entry, then rescan blocks
    /// `from_height..=to_height` and re-register every key found in a
    /// registration witness.
    ///
    /// Long-running and synchronous. A crash mid-rebuild requires running
    /// it again from scratch; partial rebuilds are not resumable.
    pub fn rebuild(
        &self,
        source: &dyn BlockSource,
        from_height: u64,
        to_height: u64,
    ) -> Result<u64, RegistryError> {
        let mut inner = self.inner.lock();

        info!(from_height, to_height, "rebuilding quantum key registry");

        let stale = match inner.store.prefix_scan(&[DB_PREFIX]) {
            Ok(entries) => entries,
            Err(e) => {
                inner.last_error = Some(e.to_string());
                return Err(e.into());
            }
        };
        for (key, _) in stale {
            if let Err(e) = inner.store.delete(&key) {
                inner.last_error = Some(e.to_string());
                return Err(e.into());
            }
        }
        inner.cache.clear();

        let mut registered = 0u64;
        for height in from_height..=to_height {
            let block = source
                .block_at(height)
                .ok_or(RegistryError::MissingBlock(height))?;

            for tx in &block.transactions {
                for input in &tx.inputs {
                    if input.witness.is_empty() {
                        continue;
                    }
                    let Ok(QuantumWitness::Registration { pubkey, .. }) =
                        parse_witness(&input.witness)
                    else {
                        continue;
                    };
                    let hash: Hash = Sha256::digest(&pubkey).into();
                    Self::register_locked(&mut inner, &hash, &pubkey)?;
                    registered += 1;
                }
            }

            let scanned = height - from_height + 1;
            if scanned % REBUILD_PROGRESS_INTERVAL == 0 {
                info!(height, registered, "registry rebuild progress");
            }
        }

        if let Err(e) = inner.store.sync() {
            inner.last_error = Some(e.to_string());
            return Err(e.into());
        }

        info!(registered, "registry rebuild complete");
        Ok(registered)
    }
}

impl<KV: KeyValueStore> PubkeyLookup for PubkeyRegistry<KV> {
    fn lookup_pubkey(&self, hash: &Hash) -> Option<Vec<u8>> {
        self.lookup(hash)
    }
}

impl<KV: KeyValueStore> Drop for PubkeyRegistry<KV> {
    fn drop(&mut self) {
        let inner = self.inner.get_mut();
        if let Err(e) = inner.store.sync() {
            warn!(error = %e, "registry flush on shutdown failed");
        }
    }
}

fn hex_prefix(bytes: &[u8]) -> String {
    bytes.iter().take(8).map(|b| format!("{b:02x}")).collect()
}
