//! # FALCON-512 Signatures
//!
//! Lattice-based post-quantum signatures (NIST level 1) used by quantum
//! witness spends.
//!
//! ## Fixed sizes
//!
//! - Private key: 1281 bytes
//! - Public key: 897 bytes
//! - Signature: 600..=752 bytes (padded and compressed sub-formats)
//!
//! ## Canonical form
//!
//! Every signature produced and every signature accepted must pass
//! [`is_canonical_signature`]. The first byte encodes the format: the low
//! nibble is log2(degree) and must be 9, the high nibble must be 2 (padded)
//! or 3 (compressed). This is the sole malleability defense.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::CryptoError;

/// FALCON-512 private key size in bytes.
pub const PRIVATE_KEY_SIZE: usize = 1281;
/// FALCON-512 public key size in bytes.
pub const PUBLIC_KEY_SIZE: usize = 897;
/// Smallest well-formed signature in bytes.
pub const MIN_SIGNATURE_SIZE: usize = 600;
/// Largest well-formed signature in bytes (compressed sub-format ceiling).
pub const MAX_SIGNATURE_SIZE: usize = 752;

/// log2 of the FALCON-512 polynomial degree, encoded in every signature
/// header's low nibble.
#[cfg_attr(not(feature = "quantum"), allow(dead_code))]
const HEADER_LOGN: u8 = 9;
/// Header high nibble for the padded sub-format.
#[cfg_attr(not(feature = "quantum"), allow(dead_code))]
const HEADER_PADDED: u8 = 0x2;
/// Header high nibble for the compressed sub-format.
#[cfg_attr(not(feature = "quantum"), allow(dead_code))]
const HEADER_COMPRESSED: u8 = 0x3;

/// Byte offset where some backend encodings embed the public key inside
/// the private key blob (`[header(1)][compressed f,g,F (383)][h (897)]`).
///
/// Fallback only, see [`derive_public_key`]: the layout is backend
/// dependent. PQClean encodes `[header(1)][f(384)][g(384)][F(512)]` with no
/// embedded public key at all, so extracted bytes are never trusted until
/// they verify a signature made with the same private key. Callers must
/// prefer a cached public key.
#[cfg_attr(not(feature = "quantum"), allow(dead_code))]
const PRIVKEY_PUBKEY_OFFSET: usize = 384;

static STARTED: AtomicBool = AtomicBool::new(false);
static LIFECYCLE: Mutex<()> = Mutex::new(());

/// Initialize the post-quantum subsystem. Idempotent and thread-safe.
pub fn start() {
    let _guard = LIFECYCLE.lock().expect("falcon lifecycle lock poisoned");
    if STARTED.load(Ordering::SeqCst) {
        return;
    }
    STARTED.store(true, Ordering::SeqCst);
    if cfg!(feature = "quantum") {
        tracing::info!("post-quantum subsystem initialized (FALCON-512)");
    } else {
        tracing::info!("post-quantum support not compiled in");
    }
}

/// Shut down the post-quantum subsystem. Idempotent; the backend has no
/// global teardown, so this only clears the lifecycle flag.
pub fn stop() {
    let _guard = LIFECYCLE.lock().expect("falcon lifecycle lock poisoned");
    if !STARTED.load(Ordering::SeqCst) {
        return;
    }
    STARTED.store(false, Ordering::SeqCst);
    tracing::info!("post-quantum subsystem shutdown");
}

/// Whether [`start`] has run without a matching [`stop`].
pub fn is_started() -> bool {
    STARTED.load(Ordering::SeqCst)
}

/// Structural canonical-form check shared by sign and verify paths.
#[cfg_attr(not(feature = "quantum"), allow(dead_code))]
fn canonical(signature: &[u8]) -> bool {
    if signature.is_empty() {
        return false;
    }
    if signature.len() < MIN_SIGNATURE_SIZE || signature.len() > MAX_SIGNATURE_SIZE {
        return false;
    }
    let header = signature[0];
    if header & 0x0f != HEADER_LOGN {
        return false;
    }
    let format = (header & 0xf0) >> 4;
    format == HEADER_PADDED || format == HEADER_COMPRESSED
}

#[cfg(feature = "quantum")]
mod imp {
    use super::*;
    use pqcrypto_falcon::falcon512;
    use pqcrypto_traits::sign::{
        DetachedSignature as _, PublicKey as _, SecretKey as _,
    };

    /// Generate a FALCON-512 keypair: `(private key, public key)`.
    pub fn generate_keypair() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        let (pk, sk) = falcon512::keypair();
        let privkey = sk.as_bytes().to_vec();
        let pubkey = pk.as_bytes().to_vec();

        // The backend is expected to match the consensus constants exactly.
        if privkey.len() != PRIVATE_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PRIVATE_KEY_SIZE,
                actual: privkey.len(),
            });
        }
        if pubkey.len() != PUBLIC_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PUBLIC_KEY_SIZE,
                actual: pubkey.len(),
            });
        }
        Ok((privkey, pubkey))
    }

    /// Sign `message` with a FALCON-512 private key.
    ///
    /// The produced signature is checked for canonical form before it is
    /// returned; a non-canonical signature is rejected immediately.
    pub fn sign(privkey: &[u8], message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if privkey.len() != PRIVATE_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PRIVATE_KEY_SIZE,
                actual: privkey.len(),
            });
        }
        let sk = falcon512::SecretKey::from_bytes(privkey)
            .map_err(|_| CryptoError::InvalidPrivateKey)?;
        let signature = falcon512::detached_sign(message, &sk)
            .as_bytes()
            .to_vec();

        if signature.len() > MAX_SIGNATURE_SIZE {
            tracing::error!(
                size = signature.len(),
                "FALCON-512 signature exceeds maximum size"
            );
            return Err(CryptoError::InvalidSignature);
        }
        if !canonical(&signature) {
            tracing::error!("FALCON-512 produced a non-canonical signature");
            return Err(CryptoError::NonCanonicalSignature);
        }
        Ok(signature)
    }

    /// Verify a FALCON-512 signature over `message`.
    ///
    /// Non-canonical signatures are always rejected.
    pub fn verify(pubkey: &[u8], message: &[u8], signature: &[u8]) -> bool {
        if pubkey.len() != PUBLIC_KEY_SIZE {
            tracing::debug!(size = pubkey.len(), "invalid FALCON-512 public key size");
            return false;
        }
        if !canonical(signature) {
            tracing::debug!(
                size = signature.len(),
                "rejecting non-canonical FALCON-512 signature"
            );
            return false;
        }
        let Ok(pk) = falcon512::PublicKey::from_bytes(pubkey) else {
            return false;
        };
        let Ok(sig) = falcon512::DetachedSignature::from_bytes(signature) else {
            return false;
        };
        falcon512::verify_detached_signature(&sig, message, &pk).is_ok()
    }

    /// Check that a signature is in canonical form.
    pub fn is_canonical_signature(signature: &[u8]) -> bool {
        canonical(signature)
    }

    /// Extract the public key from a private key blob.
    ///
    /// Fallback path only: this reads the fixed offset documented on
    /// [`PRIVKEY_PUBKEY_OFFSET`], then proves the extracted bytes by
    /// verifying a fresh signature with them. Extraction from a blob whose
    /// layout does not embed the public key there fails closed instead of
    /// returning secret polynomial material as a well-sized key. Callers
    /// that hold a cached public key must use it instead.
    pub fn derive_public_key(privkey: &[u8]) -> Result<Vec<u8>, CryptoError> {
        if privkey.len() != PRIVATE_KEY_SIZE {
            return Err(CryptoError::InvalidKeyLength {
                expected: PRIVATE_KEY_SIZE,
                actual: privkey.len(),
            });
        }
        let start = PRIVKEY_PUBKEY_OFFSET;
        let candidate = privkey[start..start + PUBLIC_KEY_SIZE].to_vec();

        let check_message = b"casq pubkey extraction check";
        let signature = sign(privkey, check_message)?;
        if !verify(&candidate, check_message, &signature) {
            tracing::debug!("extracted pubkey bytes failed signature verification");
            return Err(CryptoError::InvalidPrivateKey);
        }
        Ok(candidate)
    }

    /// Startup self-test: keypair, sign, verify, and a tamper check.
    /// Returns a boolean and never panics.
    pub fn sanity_check() -> bool {
        let message = b"casq pqc sanity check";

        let (privkey, pubkey) = match generate_keypair() {
            Ok(pair) => pair,
            Err(err) => {
                tracing::error!(%err, "FALCON-512 key generation failed during sanity check");
                return false;
            }
        };
        let signature = match sign(&privkey, message) {
            Ok(sig) => sig,
            Err(err) => {
                tracing::error!(%err, "FALCON-512 signing failed during sanity check");
                return false;
            }
        };
        if !verify(&pubkey, message, &signature) {
            tracing::error!("FALCON-512 verification failed during sanity check");
            return false;
        }

        // Flipping one byte of the message must break verification.
        let mut tampered = message.to_vec();
        tampered[0] ^= 0xff;
        if verify(&pubkey, &tampered, &signature) {
            tracing::error!("FALCON-512 verified a tampered message");
            return false;
        }

        tracing::info!("post-quantum sanity check passed");
        true
    }
}

#[cfg(not(feature = "quantum"))]
mod imp {
    use super::*;

    /// Quantum support is compiled out; key generation always fails.
    pub fn generate_keypair() -> Result<(Vec<u8>, Vec<u8>), CryptoError> {
        Err(CryptoError::QuantumDisabled)
    }

    /// Quantum support is compiled out; signing always fails.
    pub fn sign(_privkey: &[u8], _message: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::QuantumDisabled)
    }

    /// Quantum support is compiled out; verification always fails.
    pub fn verify(_pubkey: &[u8], _message: &[u8], _signature: &[u8]) -> bool {
        false
    }

    /// Quantum support is compiled out; no signature is canonical.
    pub fn is_canonical_signature(_signature: &[u8]) -> bool {
        false
    }

    /// Quantum support is compiled out; derivation always fails.
    pub fn derive_public_key(_privkey: &[u8]) -> Result<Vec<u8>, CryptoError> {
        Err(CryptoError::QuantumDisabled)
    }

    /// Quantum support is compiled out; the check passes trivially.
    pub fn sanity_check() -> bool {
        true
    }
}

pub use imp::{
    derive_public_key, generate_keypair, is_canonical_signature, sanity_check, sign, verify,
};
