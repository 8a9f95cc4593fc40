//! # Crypto Error Types

use thiserror::Error;

/// Errors from key derivation, signing and verification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CryptoError {
    /// Seed or extended key bytes were the wrong length or otherwise invalid.
    #[error("invalid master seed")]
    InvalidSeed,
    /// A derived private scalar landed outside the curve order (astronomically
    /// unlikely; surfaced rather than silently retried so callers can decide).
    #[error("derived key is invalid")]
    InvalidDerivedKey,
    /// Public key bytes were not a valid compressed secp256k1 point.
    #[error("invalid public key")]
    InvalidPublicKey,
    /// Private key bytes did not parse as a valid secp256k1 scalar.
    #[error("invalid private key")]
    InvalidPrivateKey,
    /// Signature bytes were malformed.
    #[error("invalid signature")]
    InvalidSignature,
    /// Signature did not verify against the given message and key.
    #[error("signature verification failed")]
    SignatureVerificationFailed,
}
