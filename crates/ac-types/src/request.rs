//! # Request Entities
//!
//! `ApiCallRequest` and `WithdrawalRequest`, the two request entities the
//! pipeline tracks. `short`/`regular`/`full` are modeled as a closed
//! `RequestKind` enum rather than a string tag, so a missed case is a
//! compile error rather than a runtime surprise.

use crate::ids::{EndpointId, ProviderId, RequestId, RequesterIndex, TemplateId};
use crate::parameters::Parameters;
use crate::status::{RequestErrorCode, RequestStatus};
use serde::{Deserialize, Serialize};

/// Which of the three creation events produced this request. `Short` only
/// knows the template and client at request time; `Regular` also carries
/// fulfillment parameters merged over the template's; `Full` has no
/// template and supplies every field inline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestKind {
    /// `ClientShortRequestCreated`.
    Short,
    /// `ClientRequestCreated`.
    Regular,
    /// `ClientFullRequestCreated`.
    Full,
}

/// Per-request metadata carried from the originating chain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    /// Block the creation event was included in.
    pub block_number: u64,
    /// Index of the log within that block (used for deterministic ordering).
    pub log_index: u64,
    /// The run's current chain head, used for block-age rules.
    pub current_block: u64,
    /// Configured age (in blocks) after which a `Blocked` request is dropped.
    pub ignore_blocked_requests_after_blocks: u64,
    /// Transaction hash of the creation event.
    pub transaction_hash: [u8; 32],
}

/// An API-call request record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiCallRequest {
    /// Chain-emitted request id, unique across all providers (INVARIANT-1).
    pub id: RequestId,
    /// Which creation event produced this request.
    pub kind: RequestKind,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Set when `status == Errored`.
    pub error_code: Option<RequestErrorCode>,
    /// Provider this request was observed on.
    pub provider_id: ProviderId,
    /// On-chain requester index, once resolved.
    pub requester_index: Option<RequesterIndex>,
    /// The contract that initiated the request.
    pub client_address: String,
    /// The wallet expected to submit the fulfill transaction.
    pub designated_wallet: Option<String>,
    /// Address the fulfill transaction calls back into.
    pub fulfill_address: Option<String>,
    /// 4-byte selector the fulfill transaction calls.
    pub fulfill_function_id: Option<[u8; 4]>,
    /// Endpoint this request targets, once resolved via template or inline.
    pub endpoint_id: Option<EndpointId>,
    /// Template reference; `None` for `Full` requests.
    pub template_id: Option<TemplateId>,
    /// Raw tagged-parameter blob as emitted on-chain.
    pub encoded_parameters: Vec<u8>,
    /// Decoded `{ name: value }` mapping, populated by the parameter codec.
    pub parameters: Parameters,
    /// Number of times this client has called this endpoint (replay guard
    /// input for the authorizer's endorsement step upstream).
    pub request_count: u64,
    /// Event/ordering metadata.
    pub metadata: RequestMetadata,
    /// Populated by disaggregation once the aggregated call resolves.
    pub response_value: Option<Vec<u8>>,
    /// Fingerprint of the aggregated call this request was folded into.
    pub aggregated_call_id: Option<RequestId>,
}

impl ApiCallRequest {
    /// `true` once authorization/aggregation/execution have all succeeded
    /// and a fulfill transaction can be assembled (invariant 4).
    pub fn is_fulfillable(&self) -> bool {
        self.status == RequestStatus::Pending && self.response_value.is_some()
    }
}

/// A withdrawal request record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Chain-emitted request id.
    pub id: RequestId,
    /// Provider this request was observed on.
    pub provider_id: ProviderId,
    /// On-chain requester index.
    pub requester_index: RequesterIndex,
    /// Wallet whose balance is being withdrawn.
    pub designated_wallet: String,
    /// Destination address for the withdrawn funds.
    pub destination: String,
    /// Current lifecycle status.
    pub status: RequestStatus,
    /// Event/ordering metadata.
    pub metadata: RequestMetadata,
}
