//! # ac-04-request-store
//!
//! **Component:** 4.D Request Store.
//!
//! Overlays the fulfillment/failure ids collected by the request builder
//! onto the set of stored request records. Both update functions are
//! idempotent: re-applying the same overlay ids to an already-updated
//! store produces no further state change and no duplicate logs.

#![warn(missing_docs)]

use ac_types::{ApiCallRequest, Log, RequestErrorCode, RequestId, RequestStatus, WithdrawalRequest};
use std::collections::HashSet;

/// Mark every request whose id appears in `fulfilled_ids` as `Fulfilled`.
/// Already-`Fulfilled` requests are left untouched and logged once more
/// only if this call is the one that transitions them — re-running with
/// the same ids after they are already `Fulfilled` emits no further logs.
pub fn update_fulfilled_requests(
    requests: &mut [ApiCallRequest],
    fulfilled_ids: &[RequestId],
) -> Vec<Log> {
    let fulfilled: HashSet<RequestId> = fulfilled_ids.iter().copied().collect();
    let mut logs = Vec::new();

    for request in requests.iter_mut() {
        if fulfilled.contains(&request.id) && request.status != RequestStatus::Fulfilled {
            request.status = RequestStatus::Fulfilled;
            let log = Log::debug(format!("Request ID:{} (API call) has already been fulfilled", request.id));
            log.emit();
            logs.push(log);
        }
    }

    logs
}

/// Mark every request whose id appears in `failed_ids` as `Errored` with
/// `ApiCallFailed`, unless it is already `Fulfilled`.
pub fn update_failed_requests(requests: &mut [ApiCallRequest], failed_ids: &[RequestId]) -> Vec<Log> {
    let failed: HashSet<RequestId> = failed_ids.iter().copied().collect();
    let mut logs = Vec::new();

    for request in requests.iter_mut() {
        if !failed.contains(&request.id) || request.status == RequestStatus::Fulfilled {
            continue;
        }
        if request.status == RequestStatus::Errored {
            continue;
        }
        request.status = RequestStatus::Errored;
        request.error_code = Some(RequestErrorCode::ApiCallFailed);
        let log = Log::debug(format!("request {} marked failed", request.id));
        log.emit();
        logs.push(log);
    }

    logs
}

/// Withdrawal analog of [`update_fulfilled_requests`].
pub fn update_fulfilled_withdrawals(
    withdrawals: &mut [WithdrawalRequest],
    fulfilled_ids: &[RequestId],
) -> Vec<Log> {
    let fulfilled: HashSet<RequestId> = fulfilled_ids.iter().copied().collect();
    let mut logs = Vec::new();

    for withdrawal in withdrawals.iter_mut() {
        if fulfilled.contains(&withdrawal.id) && withdrawal.status != RequestStatus::Fulfilled {
            withdrawal.status = RequestStatus::Fulfilled;
            let log = Log::debug(format!("withdrawal {} marked fulfilled", withdrawal.id));
            log.emit();
            logs.push(log);
        }
    }

    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_types::{ProviderId, RequestKind, RequestMetadata, RequesterIndex};

    fn meta() -> RequestMetadata {
        RequestMetadata {
            block_number: 1,
            log_index: 0,
            current_block: 1,
            ignore_blocked_requests_after_blocks: 50,
            transaction_hash: [0; 32],
        }
    }

    fn pending_request(id_byte: u8) -> ApiCallRequest {
        ApiCallRequest {
            id: RequestId::from_bytes([id_byte; 32]),
            kind: RequestKind::Full,
            status: RequestStatus::Pending,
            error_code: None,
            provider_id: ProviderId::from_bytes([1; 32]),
            requester_index: Some(RequesterIndex(0)),
            client_address: "0xclient".into(),
            designated_wallet: None,
            fulfill_address: None,
            fulfill_function_id: None,
            endpoint_id: None,
            template_id: None,
            encoded_parameters: vec![],
            parameters: Default::default(),
            request_count: 0,
            metadata: meta(),
            response_value: None,
            aggregated_call_id: None,
        }
    }

    #[test]
    fn marks_matching_requests_fulfilled() {
        let mut requests = vec![pending_request(1), pending_request(2)];
        let logs = update_fulfilled_requests(&mut requests, &[RequestId::from_bytes([1; 32])]);
        assert_eq!(requests[0].status, RequestStatus::Fulfilled);
        assert_eq!(requests[1].status, RequestStatus::Pending);
        assert_eq!(logs.len(), 1);
    }

    #[test]
    fn fulfilled_overlay_is_idempotent() {
        let mut requests = vec![pending_request(1)];
        let ids = [RequestId::from_bytes([1; 32])];
        update_fulfilled_requests(&mut requests, &ids);
        let logs = update_fulfilled_requests(&mut requests, &ids);
        assert!(logs.is_empty());
        assert_eq!(requests[0].status, RequestStatus::Fulfilled);
    }

    #[test]
    fn failed_overlay_does_not_override_fulfilled() {
        let mut requests = vec![pending_request(1)];
        update_fulfilled_requests(&mut requests, &[RequestId::from_bytes([1; 32])]);
        let logs = update_failed_requests(&mut requests, &[RequestId::from_bytes([1; 32])]);
        assert!(logs.is_empty());
        assert_eq!(requests[0].status, RequestStatus::Fulfilled);
    }

    #[test]
    fn failed_overlay_sets_api_call_failed_error_code() {
        let mut requests = vec![pending_request(1)];
        update_failed_requests(&mut requests, &[RequestId::from_bytes([1; 32])]);
        assert_eq!(requests[0].status, RequestStatus::Errored);
        assert_eq!(requests[0].error_code, Some(RequestErrorCode::ApiCallFailed));
    }
}
