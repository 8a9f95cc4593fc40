//! # Event Topics
//!
//! Topic hashes for the events the Airnode contract ABI emits. `Short`,
//! `Regular` and `Full` match the documented request-creation topic
//! prefixes/suffixes; the remaining topics are this engine's
//! implementation-chosen constants for the fulfillment/withdrawal events
//! (the exact values are defined by the on-chain ABI, out of this
//! engine's scope — only distinctness from one another matters here).

/// A classified (or unrecognized) event topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    /// `ClientShortRequestCreated` — `0xfcbc…46e6`.
    ClientShortRequestCreated,
    /// `ClientRequestCreated` — `0xaff6…a97b`.
    ClientRequestCreated,
    /// `ClientFullRequestCreated` — `0x775e…7e44`.
    ClientFullRequestCreated,
    /// `ClientRequestFulfilled`.
    ClientRequestFulfilled,
    /// `ClientRequestFailed`.
    ClientRequestFailed,
    /// `WithdrawalRequested`.
    WithdrawalRequested,
    /// `WithdrawalFulfilled`.
    WithdrawalFulfilled,
    /// Any topic this engine does not recognize.
    Unknown,
}

/// Raw 32-byte topic hash for [`Topic::ClientShortRequestCreated`].
pub const CLIENT_SHORT_REQUEST_CREATED: [u8; 32] = {
    let mut b = [0u8; 32];
    b[0] = 0xfc;
    b[1] = 0xbc;
    b[30] = 0x46;
    b[31] = 0xe6;
    b
};

/// Raw 32-byte topic hash for [`Topic::ClientRequestCreated`].
pub const CLIENT_REQUEST_CREATED: [u8; 32] = {
    let mut b = [0u8; 32];
    b[0] = 0xaf;
    b[1] = 0xf6;
    b[30] = 0xa9;
    b[31] = 0x7b;
    b
};

/// Raw 32-byte topic hash for [`Topic::ClientFullRequestCreated`].
pub const CLIENT_FULL_REQUEST_CREATED: [u8; 32] = {
    let mut b = [0u8; 32];
    b[0] = 0x77;
    b[1] = 0x5e;
    b[30] = 0x7e;
    b[31] = 0x44;
    b
};

/// Raw 32-byte topic hash for [`Topic::ClientRequestFulfilled`].
pub const CLIENT_REQUEST_FULFILLED: [u8; 32] = [0x11; 32];
/// Raw 32-byte topic hash for [`Topic::ClientRequestFailed`].
pub const CLIENT_REQUEST_FAILED: [u8; 32] = [0x22; 32];
/// Raw 32-byte topic hash for [`Topic::WithdrawalRequested`].
pub const WITHDRAWAL_REQUESTED: [u8; 32] = [0x33; 32];
/// Raw 32-byte topic hash for [`Topic::WithdrawalFulfilled`].
pub const WITHDRAWAL_FULFILLED: [u8; 32] = [0x44; 32];

impl Topic {
    /// Classify a raw 32-byte topic hash.
    pub fn from_hash(hash: [u8; 32]) -> Self {
        match hash {
            CLIENT_SHORT_REQUEST_CREATED => Self::ClientShortRequestCreated,
            CLIENT_REQUEST_CREATED => Self::ClientRequestCreated,
            CLIENT_FULL_REQUEST_CREATED => Self::ClientFullRequestCreated,
            CLIENT_REQUEST_FULFILLED => Self::ClientRequestFulfilled,
            CLIENT_REQUEST_FAILED => Self::ClientRequestFailed,
            WITHDRAWAL_REQUESTED => Self::WithdrawalRequested,
            WITHDRAWAL_FULFILLED => Self::WithdrawalFulfilled,
            _ => Self::Unknown,
        }
    }
}
