//! # ac-06-aggregator
//!
//! **Component:** 4.F Aggregator.
//!
//! Collapses every `Pending` `ApiCallRequest` across all providers that
//! shares an `(endpointId, canonicalized parameters)` fingerprint into one
//! [`AggregatedApiCall`], keyed by a deterministically chosen id (the first
//! participating request id encountered in provider-then-block order).
//! The chosen id is stamped back onto every
//! participating request as `aggregated_call_id` so 4.H Disaggregator can
//! look it back up.
//!
//! Determinism follows from iterating providers in the order they are
//! listed in `config`, then requests within a provider in the order the
//! event decoder already sorted them (block, then log index) — the same
//! canonical, sorted-key serialization used for the fingerprint itself.

#![warn(missing_docs)]

use ac_config::NodeConfig;
use ac_types::{
    canonical_fingerprint, AggregatedApiCall, ApiCallRequest, Log, RequestId, RequestStatus,
};
use std::collections::HashMap;

/// Aggregate `Pending` API-call requests across every provider's request
/// list, in the order the provider lists appear (which must match
/// `config`'s provider iteration order for the chosen ids to be
/// deterministic across runs).
///
/// Each participating request gets its `aggregated_call_id` set in place.
/// Returns the `aggregatedCallId -> AggregatedApiCall` table plus any
/// stage logs (requests whose trigger cannot be resolved are skipped with
/// a `WARN` — this should not happen for `Pending` requests that already
/// passed 4.E Authorizer, but the aggregator does not assume it).
pub fn aggregate(
    provider_requests: &mut [Vec<ApiCallRequest>],
    config: &NodeConfig,
) -> (HashMap<RequestId, AggregatedApiCall>, Vec<Log>) {
    let mut by_id: HashMap<RequestId, AggregatedApiCall> = HashMap::new();
    let mut fingerprint_to_id: HashMap<[u8; 32], RequestId> = HashMap::new();
    let mut logs = Vec::new();

    for requests in provider_requests.iter_mut() {
        for request in requests.iter_mut() {
            if request.status != RequestStatus::Pending {
                continue;
            }
            let Some(endpoint_id) = request.endpoint_id else {
                continue;
            };

            let trigger = match config.trigger_for_endpoint(&endpoint_id) {
                Some(t) => t,
                None => {
                    let log = Log::warn(format!(
                        "request {} is Pending but has no resolvable trigger; skipping aggregation",
                        request.id
                    ));
                    log.emit();
                    logs.push(log);
                    continue;
                }
            };

            let fingerprint = canonical_fingerprint(&endpoint_id, &request.parameters);
            let call_id = *fingerprint_to_id.entry(fingerprint).or_insert(request.id);

            by_id.entry(call_id).or_insert_with(|| AggregatedApiCall {
                id: call_id,
                endpoint_id,
                parameters: request.parameters.clone(),
                kind: request.kind,
                trigger: (trigger.ois_title.clone(), trigger.endpoint_name.clone()),
                response_value: None,
                error: None,
            });

            request.aggregated_call_id = Some(call_id);
        }
    }

    (by_id, logs)
}
