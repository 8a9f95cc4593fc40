//! # Identifiers
//!
//! `providerId` is derived deterministically from the node's master extended
//! public key; `requestId` is the 32-byte hash the chain emits for a given
//! request; `templateId` identifies a stored `(providerId, endpointId,
//! parameters)` triple; `endpointId` is the chain-registered endpoint hash.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! hash_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(pub [u8; 32]);

        impl $name {
            /// Build from raw bytes.
            pub fn from_bytes(bytes: [u8; 32]) -> Self {
                Self(bytes)
            }

            /// Raw bytes.
            pub fn as_bytes(&self) -> &[u8; 32] {
                &self.0
            }

            /// Lowercase `0x`-prefixed hex representation.
            pub fn to_hex(&self) -> String {
                format!("0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.to_hex())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.to_hex())
            }
        }
    };
}

hash_id!(ProviderId, "On-chain provider record id, derived from the master xpub.");
hash_id!(RequestId, "The 32-byte hash the chain emits for a request.");
hash_id!(TemplateId, "Identifies a stored (providerId, endpointId, parameters) triple.");
hash_id!(EndpointId, "Chain-registered endpoint hash a trigger refers to.");

/// Index of an on-chain requester account that endorses clients and funds
/// designated wallets. `None` until template/fulfillment resolution for
/// `short`/`regular` requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RequesterIndex(pub u64);

impl fmt::Display for RequesterIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_roundtrip() {
        let id = RequestId::from_bytes([0x42; 32]);
        assert_eq!(id.to_hex(), format!("0x{}", "42".repeat(32)));
    }

    #[test]
    fn equality_is_by_value() {
        assert_eq!(RequestId::from_bytes([1; 32]), RequestId::from_bytes([1; 32]));
        assert_ne!(RequestId::from_bytes([1; 32]), RequestId::from_bytes([2; 32]));
    }
}
