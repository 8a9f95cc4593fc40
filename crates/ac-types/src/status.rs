//! # Status & Error Code Enumerations
//!
//! Closed sum types for request status and error code, matched
//! exhaustively everywhere so a missed case is a compile error rather
//! than a silent fallthrough.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a request. At most one of these holds at any
/// moment (INVARIANT-2); transitions are monotone toward a terminal
/// state (`Fulfilled`, `Ignored`, `Errored`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestStatus {
    /// Eligible for execution (or already executed, awaiting submission).
    Pending,
    /// Already fulfilled on-chain this run; skip.
    Fulfilled,
    /// Not served by this node; drop silently.
    Ignored,
    /// Cannot decide yet; carried forward unless too old (INVARIANT-6).
    Blocked,
    /// Permanent failure; submitted as a fail transaction.
    Errored,
}

impl RequestStatus {
    /// Terminal statuses are never revisited by a later stage.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Fulfilled | Self::Ignored | Self::Errored)
    }
}

/// Closed set of per-request error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestErrorCode {
    /// The tagged-parameter blob failed to decode.
    RequestParameterDecodingFailed,
    /// A reserved parameter (`_type`, `_path`, `_times`) was malformed.
    ReservedParametersInvalid,
    /// `templateId` does not resolve to a stored template.
    TemplateNotFound,
    /// The template's own parameters failed to decode.
    TemplateParameterDecodingFailed,
    /// Fulfillment-side fields could not be resolved.
    InsufficientParameters,
    /// Client address is not endorsed by the declared requester.
    UnauthorizedClient,
    /// A withdrawal is already pending for this wallet.
    PendingWithdrawal,
    /// Disaggregation found no matching `AggregatedApiCall`.
    NoMatchingAggregatedCall,
    /// The external API call failed.
    ApiCallFailed,
    /// `endpointId` is not configured as a trigger.
    UnknownEndpointId,
    /// The trigger's `(oisTitle, endpointName)` does not resolve to an OIS.
    UnknownOIS,
}

impl RequestErrorCode {
    /// Stable, non-zero numeric status code emitted on a fail transaction.
    /// The upstream contract's exact taxonomy is implementation-dependent
    ///; this engine only guarantees the code
    /// is non-zero and stable across runs for the same error.
    pub fn status_code(self) -> u16 {
        match self {
            Self::RequestParameterDecodingFailed => 1,
            Self::ReservedParametersInvalid => 2,
            Self::TemplateNotFound => 3,
            Self::TemplateParameterDecodingFailed => 4,
            Self::InsufficientParameters => 5,
            Self::UnauthorizedClient => 6,
            Self::PendingWithdrawal => 7,
            Self::NoMatchingAggregatedCall => 8,
            Self::ApiCallFailed => 9,
            Self::UnknownEndpointId => 10,
            Self::UnknownOIS => 11,
        }
    }
}
