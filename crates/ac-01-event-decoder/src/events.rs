//! # Typed Events
//!
//! One struct per event shape the Airnode ABI emits.

use ac_types::{EndpointId, ProviderId, RequestId, RequesterIndex, TemplateId};

/// `ClientShortRequestCreated`: only the template reference and client
/// are known at request time.
#[derive(Debug, Clone)]
pub struct ShortRequestCreated {
    /// Provider the request targets.
    pub provider_id: ProviderId,
    /// Chain-emitted request id.
    pub request_id: RequestId,
    /// Stored `(providerId, endpointId, parameters)` template reference.
    pub template_id: TemplateId,
    /// Requesting client contract address.
    pub client_address: String,
}

/// `ClientRequestCreated`: template plus fulfillment parameters.
#[derive(Debug, Clone)]
pub struct RegularRequestCreated {
    /// Provider the request targets.
    pub provider_id: ProviderId,
    /// Chain-emitted request id.
    pub request_id: RequestId,
    /// Requesting client contract address.
    pub client_address: String,
    /// Stored template reference.
    pub template_id: TemplateId,
    /// On-chain requester index.
    pub requester_index: RequesterIndex,
    /// Wallet expected to submit the fulfill transaction.
    pub designated_wallet: String,
    /// Address the fulfill transaction calls back into.
    pub fulfill_address: String,
    /// 4-byte selector the fulfill transaction calls.
    pub fulfill_function_id: [u8; 4],
    /// Tagged-parameter blob, decoded by the parameter codec.
    pub encoded_parameters: Vec<u8>,
}

/// `ClientFullRequestCreated`: no template; every field supplied inline.
#[derive(Debug, Clone)]
pub struct FullRequestCreated {
    /// Provider the request targets.
    pub provider_id: ProviderId,
    /// Chain-emitted request id.
    pub request_id: RequestId,
    /// Requesting client contract address.
    pub client_address: String,
    /// On-chain requester index.
    pub requester_index: RequesterIndex,
    /// Wallet expected to submit the fulfill transaction.
    pub designated_wallet: String,
    /// Address the fulfill transaction calls back into.
    pub fulfill_address: String,
    /// 4-byte selector the fulfill transaction calls.
    pub fulfill_function_id: [u8; 4],
    /// Endpoint this request targets (no template to resolve it from).
    pub endpoint_id: EndpointId,
    /// Tagged-parameter blob, decoded by the parameter codec.
    pub encoded_parameters: Vec<u8>,
}

/// `ClientRequestFulfilled`.
#[derive(Debug, Clone)]
pub struct RequestFulfilled {
    /// Provider the fulfillment was observed on.
    pub provider_id: ProviderId,
    /// The request this fulfillment overlays.
    pub request_id: RequestId,
    /// Non-zero status code signals failure; zero signals success.
    pub status_code: u16,
    /// ABI-encoded response data, when `status_code == 0`.
    pub data: Vec<u8>,
}

/// `ClientRequestFailed`.
#[derive(Debug, Clone)]
pub struct RequestFailed {
    /// Provider the failure was observed on.
    pub provider_id: ProviderId,
    /// The request this failure overlays.
    pub request_id: RequestId,
}

/// `WithdrawalRequested`.
#[derive(Debug, Clone)]
pub struct WithdrawalRequestedEvent {
    /// Provider the withdrawal targets.
    pub provider_id: ProviderId,
    /// Chain-emitted request id.
    pub request_id: RequestId,
    /// On-chain requester index.
    pub requester_index: RequesterIndex,
    /// Wallet whose balance is being withdrawn.
    pub designated_wallet: String,
    /// Destination address for the withdrawn funds.
    pub destination: String,
}

/// `WithdrawalFulfilled`.
#[derive(Debug, Clone)]
pub struct WithdrawalFulfilledEvent {
    /// Provider the withdrawal targets.
    pub provider_id: ProviderId,
    /// The withdrawal this fulfillment overlays.
    pub request_id: RequestId,
}

/// Per-event metadata stamped on by the decoder.
#[derive(Debug, Clone, Copy)]
pub struct EventMeta {
    /// Block the creation event was included in.
    pub block_number: u64,
    /// Index of the log within that block.
    pub log_index: u64,
    /// Transaction hash of the creation event.
    pub transaction_hash: [u8; 32],
    /// The run's current chain head.
    pub current_block: u64,
    /// Configured age (in blocks) after which a `Blocked` request is dropped.
    pub ignore_blocked_requests_after_blocks: u64,
}

/// A classified chain event.
#[derive(Debug, Clone)]
pub enum DecodedEvent {
    /// `ClientShortRequestCreated`.
    ClientShortRequestCreated(ShortRequestCreated),
    /// `ClientRequestCreated`.
    ClientRequestCreated(RegularRequestCreated),
    /// `ClientFullRequestCreated`.
    ClientFullRequestCreated(FullRequestCreated),
    /// `ClientRequestFulfilled`.
    ClientRequestFulfilled(RequestFulfilled),
    /// `ClientRequestFailed`.
    ClientRequestFailed(RequestFailed),
    /// `WithdrawalRequested`.
    WithdrawalRequested(WithdrawalRequestedEvent),
    /// `WithdrawalFulfilled`.
    WithdrawalFulfilled(WithdrawalFulfilledEvent),
}

/// An event plus the metadata it was stamped with.
#[derive(Debug, Clone)]
pub struct DecodedLog {
    /// The classified event.
    pub event: DecodedEvent,
    /// Its metadata.
    pub meta: EventMeta,
}
