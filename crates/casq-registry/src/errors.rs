//! Registry and storage errors.

/// Failure from the key-value store port.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum KVStoreError {
    /// An underlying I/O or backend failure.
    #[error("storage I/O error: {message}")]
    Io {
        /// Backend-supplied failure description.
        message: String,
    },
}

/// Failure from a registry operation.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The key being registered is not 897 bytes.
    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] KVStoreError),

    /// Rebuild asked for a block the source cannot provide.
    #[error("block {0} not available for rebuild")]
    MissingBlock(u64),
}
