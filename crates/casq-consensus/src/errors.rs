//! Witness codec errors.

/// Why a witness stack element failed to parse or build.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum WitnessError {
    /// The witness stack has no elements.
    #[error("empty witness stack")]
    EmptyStack,

    /// The first stack element is empty.
    #[error("empty witness element")]
    EmptyElement,

    /// The marker byte is neither registration nor reference.
    #[error("unknown witness marker: {0:#04x}")]
    UnknownMarker(u8),

    /// The element is the wrong size for its marker.
    #[error("invalid witness size for marker {marker:#04x}: {actual} bytes")]
    InvalidSize {
        /// The marker byte that selected the layout.
        marker: u8,
        /// The element size actually seen.
        actual: usize,
    },

    /// A public key passed to the builder has the wrong length.
    #[error("invalid public key length: expected {expected}, got {actual}")]
    InvalidKeyLength {
        /// Required length in bytes.
        expected: usize,
        /// Length actually supplied.
        actual: usize,
    },

    /// A signature passed to the builder is empty or oversized.
    #[error("invalid signature length: {0}")]
    InvalidSignatureLength(usize),
}
