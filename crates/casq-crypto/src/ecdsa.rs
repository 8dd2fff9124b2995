//! # ECDSA Signatures (secp256k1)
//!
//! Legacy-path signatures for the dual-algorithm key container.
//!
//! ## Security Properties
//!
//! - RFC 6979 deterministic nonces (no RNG dependency for signing)
//! - Low-S normalization
//! - Rejection-sampled key generation against the curve's validity predicate

use k256::ecdsa::hazmat::SignPrimitive;
use k256::ecdsa::signature::hazmat::PrehashVerifier;
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use k256::FieldBytes;
use rand::RngCore;
use sha2::Sha256;

use casq_types::Hash;

use crate::CryptoError;

/// Secret key size in bytes.
pub const SECRET_KEY_SIZE: usize = 32;
/// Compressed SEC1 public key size in bytes.
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;
/// Uncompressed SEC1 public key size in bytes.
pub const UNCOMPRESSED_PUBLIC_KEY_SIZE: usize = 65;

/// Whether `bytes` is a valid secp256k1 secret key.
pub fn is_valid_secret(bytes: &[u8; SECRET_KEY_SIZE]) -> bool {
    SigningKey::from_bytes(bytes.into()).is_ok()
}

/// Generate a secret key by rejection sampling: draw 32 random bytes until
/// they satisfy the curve's validity predicate.
pub fn generate_secret() -> [u8; SECRET_KEY_SIZE] {
    let mut rng = rand::thread_rng();
    let mut bytes = [0u8; SECRET_KEY_SIZE];
    loop {
        rng.fill_bytes(&mut bytes);
        if is_valid_secret(&bytes) {
            return bytes;
        }
    }
}

/// Derive the SEC1-encoded public key for a secret key.
///
/// Returns 33 bytes when `compressed`, 65 otherwise.
pub fn public_key(
    secret: &[u8; SECRET_KEY_SIZE],
    compressed: bool,
) -> Result<Vec<u8>, CryptoError> {
    let signing_key =
        SigningKey::from_bytes(secret.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;
    let point = signing_key.verifying_key().to_encoded_point(compressed);
    Ok(point.as_bytes().to_vec())
}

/// Sign a 32-byte message hash, returning a DER-encoded low-S signature.
///
/// `test_case` feeds RFC 6979 additional entropy so tests can obtain
/// distinct deterministic nonces for the same key and hash; `0` means no
/// extra entropy.
pub fn sign(
    secret: &[u8; SECRET_KEY_SIZE],
    hash: &Hash,
    test_case: u32,
) -> Result<Vec<u8>, CryptoError> {
    let signing_key =
        SigningKey::from_bytes(secret.into()).map_err(|_| CryptoError::InvalidPrivateKey)?;

    let mut extra_entropy = [0u8; 32];
    extra_entropy[..4].copy_from_slice(&test_case.to_le_bytes());
    let ad: &[u8] = if test_case != 0 { &extra_entropy } else { &[] };

    let z = FieldBytes::from(*hash);
    let (signature, _recovery_id) = signing_key
        .as_nonzero_scalar()
        .try_sign_prehashed_rfc6979::<Sha256>(&z, ad)
        .map_err(|_| CryptoError::SigningFailed)?;

    let signature: Signature = signature.normalize_s().unwrap_or(signature);
    Ok(signature.to_der().as_bytes().to_vec())
}

/// Verify a DER-encoded signature over a 32-byte message hash.
pub fn verify(pubkey: &[u8], hash: &Hash, signature_der: &[u8]) -> bool {
    let Ok(verifying_key) = VerifyingKey::from_sec1_bytes(pubkey) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(signature_der) else {
        return false;
    };
    let signature = signature.normalize_s().unwrap_or(signature);
    verifying_key.verify_prehash(hash, &signature).is_ok()
}
