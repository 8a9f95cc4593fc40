//! # Master HDNode
//!
//! The node's identity is a single master seed from which: (1) the
//! `providerId` and `xpub` are derived deterministically, and (2) per-`requesterIndex`
//! designated wallets are derived on demand (consumed by 4.I Transaction
//! Assembler).
//!
//! Child derivation here is HMAC-based (HMAC-SHA512 over the chain code,
//! parent key and index) rather than the exact secp256k1 point-tweak BIP32
//! construction — it is deterministic, one-way, and collision-resistant
//! like BIP32, but does not support independent public-key-only ("neutered")
//! derivation. See DESIGN.md for the rationale; nothing downstream needs
//! neutered derivation.

use crate::ecdsa::Secp256k1KeyPair;
use crate::errors::CryptoError;
use ac_types::ProviderId;
use hmac::{Hmac, Mac};
use k256::ecdsa::VerifyingKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use sha2::Sha512;
use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

type HmacSha512 = Hmac<Sha512>;

/// A wallet derived from the master HDNode at a given index (the
/// designated wallet for a `requesterIndex`, or the master wallet itself
/// at index 0).
pub struct DerivedWallet {
    /// Derivation index this wallet was produced from.
    pub index: u64,
    /// The wallet's keypair.
    pub keypair: Secp256k1KeyPair,
    /// Ethereum-style checksum-free address, `0x`-prefixed lowercase hex.
    pub address: String,
}

impl DerivedWallet {
    fn from_key_bytes(index: u64, key_bytes: [u8; 32]) -> Result<Self, CryptoError> {
        let keypair = Secp256k1KeyPair::from_bytes(key_bytes)?;
        let address = address_from_public_key(&keypair.public_key());
        Ok(Self { index, keypair, address })
    }
}

/// The master HDNode: a seed plus its BIP32-style master chain code.
pub struct MasterHDNode {
    master_key: [u8; 32],
    chain_code: [u8; 32],
}

impl MasterHDNode {
    /// Derive the master key and chain code from a seed (e.g. a BIP39
    /// mnemonic's seed bytes), following BIP32's master key generation:
    /// `HMAC-SHA512("Bitcoin seed", seed) = (masterKey, chainCode)`.
    pub fn from_seed(seed: &[u8]) -> Result<Self, CryptoError> {
        if seed.is_empty() {
            return Err(CryptoError::InvalidSeed);
        }
        let mut mac = HmacSha512::new_from_slice(b"Bitcoin seed").map_err(|_| CryptoError::InvalidSeed)?;
        mac.update(seed);
        let digest = mac.finalize().into_bytes();

        let mut master_key = [0u8; 32];
        let mut chain_code = [0u8; 32];
        master_key.copy_from_slice(&digest[..32]);
        chain_code.copy_from_slice(&digest[32..]);

        // A master key that doesn't parse as a valid scalar is
        // astronomically unlikely; surface it rather than silently
        // substituting a different seed.
        Secp256k1KeyPair::from_bytes(master_key).map_err(|_| CryptoError::InvalidDerivedKey)?;

        Ok(Self { master_key, chain_code })
    }

    /// The node's master wallet, at derivation index 0.
    pub fn master_wallet(&self) -> Result<DerivedWallet, CryptoError> {
        DerivedWallet::from_key_bytes(0, self.master_key)
    }

    /// Derive the wallet at `index` — the address expected to submit the
    /// fulfill transaction for a given `requesterIndex`.
    pub fn derive_wallet(&self, index: u64) -> Result<DerivedWallet, CryptoError> {
        for attempt in 0u32..4 {
            let mut mac = HmacSha512::new_from_slice(&self.chain_code).map_err(|_| CryptoError::InvalidSeed)?;
            mac.update(&[0x00]);
            mac.update(&self.master_key);
            mac.update(&index.to_be_bytes());
            mac.update(&attempt.to_be_bytes());
            let digest = mac.finalize().into_bytes();

            let mut child_key = [0u8; 32];
            child_key.copy_from_slice(&digest[..32]);

            if let Ok(wallet) = DerivedWallet::from_key_bytes(index, child_key) {
                return Ok(wallet);
            }
        }
        Err(CryptoError::InvalidDerivedKey)
    }

    /// `providerId`: Keccak-256 of the master wallet's compressed public
    /// key, truncated to 32 bytes (it already is 32 from Keccak-256).
    pub fn provider_id(&self) -> Result<ProviderId, CryptoError> {
        let wallet = self.master_wallet()?;
        let mut hasher = Keccak256::new();
        hasher.update(wallet.keypair.public_key().as_bytes());
        let digest = hasher.finalize();
        let mut out = [0u8; 32];
        out.copy_from_slice(&digest);
        Ok(ProviderId::from_bytes(out))
    }

    /// Simplified extended public key: hex of `chain_code || compressed
    /// master pubkey`. Not a base58check BIP32 `xpub` (no version bytes,
    /// depth, or parent fingerprint) — sufficient for this engine's use,
    /// which only ever compares `xpub` for equality against the on-chain
    /// provider record.
    pub fn xpub(&self) -> Result<String, CryptoError> {
        let wallet = self.master_wallet()?;
        let mut bytes = Vec::with_capacity(32 + 33);
        bytes.extend_from_slice(&self.chain_code);
        bytes.extend_from_slice(wallet.keypair.public_key().as_bytes());
        Ok(format!("0x{}", hex::encode(bytes)))
    }
}

impl Drop for MasterHDNode {
    fn drop(&mut self) {
        self.master_key.zeroize();
        self.chain_code.zeroize();
    }
}

fn address_from_public_key(public_key: &crate::ecdsa::Secp256k1PublicKey) -> String {
    let verifying_key = VerifyingKey::from_sec1_bytes(public_key.as_bytes())
        .expect("public key was already validated on construction");
    let uncompressed = verifying_key.to_encoded_point(false);
    let mut hasher = Keccak256::new();
    hasher.update(&uncompressed.as_bytes()[1..]);
    let digest = hasher.finalize();
    format!("0x{}", hex::encode(&digest[12..]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_id_is_deterministic_for_the_same_seed() {
        let a = MasterHDNode::from_seed(b"a reproducible test seed value!").unwrap();
        let b = MasterHDNode::from_seed(b"a reproducible test seed value!").unwrap();
        assert_eq!(a.provider_id().unwrap(), b.provider_id().unwrap());
        assert_eq!(a.xpub().unwrap(), b.xpub().unwrap());
    }

    #[test]
    fn different_seeds_yield_different_provider_ids() {
        let a = MasterHDNode::from_seed(b"seed one is definitely not seed2").unwrap();
        let b = MasterHDNode::from_seed(b"seed two is definitely not seed1").unwrap();
        assert_ne!(a.provider_id().unwrap(), b.provider_id().unwrap());
    }

    #[test]
    fn derived_wallets_are_distinct_per_index_but_stable() {
        let node = MasterHDNode::from_seed(b"another reproducible seed value").unwrap();
        let w0a = node.derive_wallet(0).unwrap();
        let w0b = node.derive_wallet(0).unwrap();
        let w1 = node.derive_wallet(1).unwrap();
        assert_eq!(w0a.address, w0b.address);
        assert_ne!(w0a.address, w1.address);
    }

    #[test]
    fn empty_seed_is_rejected() {
        assert!(MasterHDNode::from_seed(b"").is_err());
    }
}
