//! # Aggregated API Call
//!
//! The coalesced representation of equivalent `ApiCallRequest`s observed
//! across providers.

use crate::ids::{EndpointId, RequestId};
use crate::parameters::Parameters;
use crate::request::RequestKind;
use crate::status::RequestErrorCode;
use serde::{Deserialize, Serialize};

/// One external-API call shared by every request that fingerprints the
/// same `(endpointId, parameters)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregatedApiCall {
    /// Deterministically chosen id: the first participating request id
    /// encountered in provider-then-block order.
    pub id: RequestId,
    /// Endpoint shared by every participating request.
    pub endpoint_id: EndpointId,
    /// Canonical parameters shared by every participating request.
    pub parameters: Parameters,
    /// Request kind of the first participating request (informational;
    /// execution does not depend on it).
    pub kind: RequestKind,
    /// `(oisTitle, endpointName)` the authorizer resolved for this call.
    pub trigger: (String, String),
    /// ABI-encoded response, set by the executor on success.
    pub response_value: Option<Vec<u8>>,
    /// Set by the executor on failure; mutually exclusive with
    /// `response_value`.
    pub error: Option<RequestErrorCode>,
}

impl AggregatedApiCall {
    /// A call is resolved once it has either a response or an error.
    pub fn is_resolved(&self) -> bool {
        self.response_value.is_some() || self.error.is_some()
    }
}
