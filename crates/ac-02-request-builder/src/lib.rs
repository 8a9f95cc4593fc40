//! # ac-02-request-builder
//!
//! **Component:** 4.B Request Builder.
//!
//! Materializes one request record per creation event. `kind` is
//! determined by which creation event produced it; fulfillment-side
//! fields may be absent until template resolution for `Short`/`Regular`
//! requests. Also separates out the fulfillment/failure/withdrawal
//! overlay events so 4.D Request Store can apply them.

#![warn(missing_docs)]

pub mod template;

pub use template::{resolve_templates, Template, TemplateSource};

use ac_01_event_decoder::{DecodedEvent, DecodedLog, EventMeta};
use ac_types::{
    ApiCallRequest, Log, Parameters, RequestKind, RequestMetadata, RequestStatus, WithdrawalRequest,
};

/// Everything the request builder produces from one batch of decoded logs.
#[derive(Debug, Default)]
pub struct BuildOutput {
    /// Freshly materialized API-call requests, all `Pending`.
    pub api_calls: Vec<ApiCallRequest>,
    /// Freshly materialized withdrawal requests, all `Pending`.
    pub withdrawals: Vec<WithdrawalRequest>,
    /// Request ids a `ClientRequestFulfilled` event was observed for.
    pub fulfilled_request_ids: Vec<ac_types::RequestId>,
    /// Request ids a `ClientRequestFailed` event was observed for.
    pub failed_request_ids: Vec<ac_types::RequestId>,
    /// Withdrawal ids a `WithdrawalFulfilled` event was observed for.
    pub fulfilled_withdrawal_ids: Vec<ac_types::RequestId>,
}

fn metadata(meta: &EventMeta) -> RequestMetadata {
    RequestMetadata {
        block_number: meta.block_number,
        log_index: meta.log_index,
        current_block: meta.current_block,
        ignore_blocked_requests_after_blocks: meta.ignore_blocked_requests_after_blocks,
        transaction_hash: meta.transaction_hash,
    }
}

/// Build request records from a batch of decoded logs, already ordered by
/// the event decoder.
pub fn build(decoded: Vec<DecodedLog>) -> (BuildOutput, Vec<Log>) {
    let mut out = BuildOutput::default();
    let logs = Vec::new();

    for DecodedLog { event, meta } in decoded {
        match event {
            DecodedEvent::ClientShortRequestCreated(e) => {
                out.api_calls.push(ApiCallRequest {
                    id: e.request_id,
                    kind: RequestKind::Short,
                    status: RequestStatus::Pending,
                    error_code: None,
                    provider_id: e.provider_id,
                    requester_index: None,
                    client_address: e.client_address,
                    designated_wallet: None,
                    fulfill_address: None,
                    fulfill_function_id: None,
                    endpoint_id: None,
                    template_id: Some(e.template_id),
                    encoded_parameters: Vec::new(),
                    parameters: Parameters::new(),
                    request_count: 0,
                    metadata: metadata(&meta),
                    response_value: None,
                    aggregated_call_id: None,
                });
            }
            DecodedEvent::ClientRequestCreated(e) => {
                out.api_calls.push(ApiCallRequest {
                    id: e.request_id,
                    kind: RequestKind::Regular,
                    status: RequestStatus::Pending,
                    error_code: None,
                    provider_id: e.provider_id,
                    requester_index: Some(e.requester_index),
                    client_address: e.client_address,
                    designated_wallet: Some(e.designated_wallet),
                    fulfill_address: Some(e.fulfill_address),
                    fulfill_function_id: Some(e.fulfill_function_id),
                    endpoint_id: None,
                    template_id: Some(e.template_id),
                    encoded_parameters: e.encoded_parameters,
                    parameters: Parameters::new(),
                    request_count: 0,
                    metadata: metadata(&meta),
                    response_value: None,
                    aggregated_call_id: None,
                });
            }
            DecodedEvent::ClientFullRequestCreated(e) => {
                out.api_calls.push(ApiCallRequest {
                    id: e.request_id,
                    kind: RequestKind::Full,
                    status: RequestStatus::Pending,
                    error_code: None,
                    provider_id: e.provider_id,
                    requester_index: Some(e.requester_index),
                    client_address: e.client_address,
                    designated_wallet: Some(e.designated_wallet),
                    fulfill_address: Some(e.fulfill_address),
                    fulfill_function_id: Some(e.fulfill_function_id),
                    endpoint_id: Some(e.endpoint_id),
                    template_id: None,
                    encoded_parameters: e.encoded_parameters,
                    parameters: Parameters::new(),
                    request_count: 0,
                    metadata: metadata(&meta),
                    response_value: None,
                    aggregated_call_id: None,
                });
            }
            DecodedEvent::ClientRequestFulfilled(e) => {
                out.fulfilled_request_ids.push(e.request_id);
            }
            DecodedEvent::ClientRequestFailed(e) => {
                out.failed_request_ids.push(e.request_id);
            }
            DecodedEvent::WithdrawalRequested(e) => {
                out.withdrawals.push(WithdrawalRequest {
                    id: e.request_id,
                    provider_id: e.provider_id,
                    requester_index: e.requester_index,
                    designated_wallet: e.designated_wallet,
                    destination: e.destination,
                    status: RequestStatus::Pending,
                    metadata: metadata(&meta),
                });
            }
            DecodedEvent::WithdrawalFulfilled(e) => {
                out.fulfilled_withdrawal_ids.push(e.request_id);
            }
        }
    }

    (out, logs)
}
