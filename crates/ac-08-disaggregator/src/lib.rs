//! # ac-08-disaggregator
//!
//! **Component:** 4.H Disaggregator.
//!
//! For each provider's `Pending` API-call requests, looks up the
//! [`AggregatedApiCall`] by the request's `aggregated_call_id` and copies
//! the result back down:
//!
//! - found with `responseValue` → copy onto the request, stays `Pending`.
//! - found with `error` → `Errored(ApiCallFailed)`.
//! - not found (or a defensive parameter mismatch) → `Blocked` with
//!   `NoMatchingAggregatedCall`, logged once per request.

#![warn(missing_docs)]

use ac_types::{AggregatedApiCall, ApiCallRequest, Log, RequestErrorCode, RequestId, RequestStatus};
use std::collections::HashMap;

/// Disaggregate one provider's requests in place against the coordinator's
/// aggregated-call table.
pub fn disaggregate(
    requests: &mut [ApiCallRequest],
    aggregated: &HashMap<RequestId, AggregatedApiCall>,
) -> Vec<Log> {
    let mut logs = Vec::new();

    for request in requests.iter_mut() {
        if request.status != RequestStatus::Pending {
            continue;
        }

        let matched = request
            .aggregated_call_id
            .and_then(|call_id| aggregated.get(&call_id))
            // Defensive check: a provider's request
            // parameters must still match the aggregated call's; anything
            // else is treated as "not found".
            .filter(|call| call.parameters == request.parameters);

        match matched {
            Some(call) if call.response_value.is_some() => {
                request.response_value = call.response_value.clone();
            }
            Some(call) if call.error.is_some() => {
                request.status = RequestStatus::Errored;
                request.error_code = Some(RequestErrorCode::ApiCallFailed);
            }
            _ => {
                request.status = RequestStatus::Blocked;
                request.error_code = Some(RequestErrorCode::NoMatchingAggregatedCall);
                let log = Log::error(
                    format!("Unable to find matching aggregated API calls for Request:{}", request.id),
                    None,
                );
                log.emit();
                logs.push(log);
            }
        }
    }

    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_types::{EndpointId, ParameterValue, Parameters, ProviderId, RequestKind, RequestMetadata, RequesterIndex};

    fn meta() -> RequestMetadata {
        RequestMetadata {
            block_number: 1,
            log_index: 0,
            current_block: 1,
            ignore_blocked_requests_after_blocks: 50,
            transaction_hash: [0; 32],
        }
    }

    fn request(id_byte: u8, params: Parameters, call_id: Option<RequestId>) -> ApiCallRequest {
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
            endpoint_id: Some(EndpointId::from_bytes([9; 32])),
            template_id: None,
            encoded_parameters: vec![],
            parameters: params,
            request_count: 0,
            metadata: meta(),
            response_value: None,
            aggregated_call_id: call_id,
        }
    }

    fn resolved_call(id_byte: u8, params: Parameters, response: Option<Vec<u8>>, error: Option<RequestErrorCode>) -> AggregatedApiCall {
        AggregatedApiCall {
            id: RequestId::from_bytes([id_byte; 32]),
            endpoint_id: EndpointId::from_bytes([9; 32]),
            parameters: params,
            kind: RequestKind::Full,
            trigger: ("ois".into(), "endpoint".into()),
            response_value: response,
            error,
        }
    }

    #[test]
    fn fan_out_to_three_providers_copies_the_same_response_value() {
        let params = Parameters::new();
        let call_id = RequestId::from_bytes([99; 32]);
        let mut table = HashMap::new();
        table.insert(call_id, resolved_call(99, params.clone(), Some(vec![1, 2, 3]), None));

        let mut providers = vec![
            vec![request(1, params.clone(), Some(call_id))],
            vec![request(2, params.clone(), Some(call_id))],
            vec![request(3, params, Some(call_id))],
        ];

        let mut all_logs = Vec::new();
        for provider in providers.iter_mut() {
            all_logs.extend(disaggregate(provider, &table));
        }

        assert!(all_logs.is_empty());
        for provider in &providers {
            assert_eq!(provider[0].response_value, Some(vec![1, 2, 3]));
            assert_eq!(provider[0].status, RequestStatus::Pending);
        }
    }

    #[test]
    fn parameter_mismatch_blocks_with_no_matching_aggregated_call() {
        let mut eth = Parameters::new();
        eth.insert("from".to_string(), ParameterValue::Str("ETH".to_string()));
        let mut btc = Parameters::new();
        btc.insert("from".to_string(), ParameterValue::Str("BTC".to_string()));

        let call_id = RequestId::from_bytes([99; 32]);
        let mut table = HashMap::new();
        table.insert(call_id, resolved_call(99, btc.clone(), Some(vec![0x12, 0x3]), None));

        let mut provider0 = vec![request(1, eth, Some(call_id))];
        let mut provider1 = vec![request(2, btc, Some(call_id))];

        let logs0 = disaggregate(&mut provider0, &table);
        let logs1 = disaggregate(&mut provider1, &table);

        assert_eq!(provider0[0].status, RequestStatus::Blocked);
        assert_eq!(provider0[0].error_code, Some(RequestErrorCode::NoMatchingAggregatedCall));
        assert_eq!(logs0.len(), 1);

        assert_eq!(provider1[0].status, RequestStatus::Pending);
        assert_eq!(provider1[0].response_value, Some(vec![0x12, 0x3]));
        assert!(logs1.is_empty());
    }

    #[test]
    fn aggregated_error_propagates_as_errored() {
        let params = Parameters::new();
        let call_id = RequestId::from_bytes([99; 32]);
        let mut table = HashMap::new();
        table.insert(call_id, resolved_call(99, params.clone(), None, Some(RequestErrorCode::ApiCallFailed)));

        let mut provider = vec![request(1, params, Some(call_id))];
        disaggregate(&mut provider, &table);

        assert_eq!(provider[0].status, RequestStatus::Errored);
        assert_eq!(provider[0].error_code, Some(RequestErrorCode::ApiCallFailed));
    }

    #[test]
    fn missing_aggregated_call_id_is_blocked() {
        let mut provider = vec![request(1, Parameters::new(), None)];
        let logs = disaggregate(&mut provider, &HashMap::new());

        assert_eq!(provider[0].status, RequestStatus::Blocked);
        assert_eq!(logs.len(), 1);
    }
}
