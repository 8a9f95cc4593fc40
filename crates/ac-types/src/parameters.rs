//! # Parameters & Canonicalization
//!
//! `Parameters` is the decoded `{ name: value }` mapping produced by the
//! parameter codec. `canonical_fingerprint` sorts keys lexicographically,
//! stringifies values canonically, and hashes with Keccak-256 so the
//! aggregator's fingerprint is stable across runs and across providers.

use crate::ids::EndpointId;
use serde::{Deserialize, Serialize};
use sha3::{Digest, Keccak256};
use std::collections::BTreeMap;

/// A single decoded parameter value. Airnode's OIS type set is wider; this
/// engine supports the subset needed to canonicalize and re-encode
/// responses, modeled as a closed enum rather than a type string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParameterValue {
    /// UTF-8 string, used as-is in canonical form.
    Str(String),
    /// Arbitrary bytes, canonicalized as lowercase `0x`-prefixed hex.
    Bytes(Vec<u8>),
    /// Signed integer, canonicalized as lowercase `0x`-prefixed hex of its
    /// big-endian two's-complement magnitude bytes.
    Int(i128),
    /// Boolean, canonicalized as `"true"`/`"false"`.
    Bool(bool),
}

impl ParameterValue {
    /// Canonical string form used both for display and for fingerprinting.
    pub fn canonical_string(&self) -> String {
        match self {
            Self::Str(s) => s.clone(),
            Self::Bytes(b) => format!("0x{}", hex::encode(b)),
            Self::Int(i) => format!("0x{}", hex::encode(i.to_be_bytes())),
            Self::Bool(b) => b.to_string(),
        }
    }
}

/// Decoded `{ name: value }` mapping. Keeps insertion order via a
/// `BTreeMap` so iteration is already lexicographic by name, which is
/// exactly the canonicalization order the aggregator needs.
pub type Parameters = BTreeMap<String, ParameterValue>;

/// Canonicalize `(endpointId, parameters)` into the fingerprint key used
/// to coalesce equivalent `ApiCallRequest`s across providers. Two requests with the same `endpointId` and parameter mapping
/// always produce the same fingerprint regardless of provider iteration
/// order, satisfying invariant 1 and testable property 1.
pub fn canonical_fingerprint(endpoint_id: &EndpointId, parameters: &Parameters) -> [u8; 32] {
    let mut buf = String::new();
    buf.push_str(&endpoint_id.to_hex());
    buf.push('|');
    for (i, (name, value)) in parameters.iter().enumerate() {
        if i > 0 {
            buf.push('&');
        }
        buf.push_str(name);
        buf.push('=');
        buf.push_str(&value.canonical_string());
    }

    let mut hasher = Keccak256::new();
    hasher.update(buf.as_bytes());
    let digest = hasher.finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}
