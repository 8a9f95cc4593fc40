//! # ac-crypto - Master Wallet Derivation & Transaction Signing
//!
//! **Component:** supports 4.J Provider Initializer, 4.I Transaction
//! Assembler.
//!
//! ## Components
//!
//! | Module | Algorithm | Use Case |
//! |--------|-----------|----------|
//! | `hdnode` | BIP32-style HMAC-SHA512 derivation over secp256k1 | Master wallet, `providerId`/`xpub` |
//! | `ecdsa` | secp256k1 (RFC 6979 deterministic nonces) | Fulfill/fail/createProvider transaction signing |
//!
//! `providerId` is derived deterministically from the node's master
//! extended public key.

#![warn(missing_docs)]

pub mod ecdsa;
pub mod errors;
pub mod hdnode;

pub use ecdsa::{Secp256k1KeyPair, Secp256k1Signature};
pub use errors::CryptoError;
pub use hdnode::{DerivedWallet, MasterHDNode};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
