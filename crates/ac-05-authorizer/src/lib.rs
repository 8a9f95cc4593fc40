//! # ac-05-authorizer
//!
//! **Component:** 4.E Authorizer.
//!
//! Applies the five-step authorization rule chain to each `Pending`
//! API-call request, in order, first match wins. Endorsement is resolved
//! through the [`EndorsementSource`] collaborator trait rather than a
//! concrete RPC client, mirroring how the event decoder and executor stay
//! agnostic of the concrete chain/HTTP client underneath them.

#![warn(missing_docs)]

use ac_config::NodeConfig;
use ac_types::{ApiCallRequest, Log, ParameterValue, Parameters, RequestErrorCode, RequestStatus};

/// Resolves whether a client contract is endorsed by a given requester
/// index. Backed by a batched convenience view call in production; tests
/// use an in-memory table.
pub trait EndorsementSource {
    /// `true` if `client_address` is endorsed by `requester_index`.
    fn is_endorsed(&self, requester_index: u64, client_address: &str) -> bool;
}

/// Reserved parameters extracted from a request's merged parameter set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedParameters {
    /// `_type`: the ABI type the response value is encoded as.
    pub response_type: Option<String>,
    /// `_path`: a dotted path into the API response to extract.
    pub path: Option<String>,
    /// `_times`: an integer multiplier applied to numeric responses.
    pub times: Option<i128>,
}

/// Extract `_type`/`_path`/`_times` from a request's merged parameters.
/// Exposed beyond this crate because 4.G Executor
/// needs the same reserved parameters to shape its response encoding.
pub fn extract_reserved(parameters: &Parameters) -> Result<ReservedParameters, ()> {
    let mut reserved = ReservedParameters::default();

    if let Some(value) = parameters.get("_type") {
        match value {
            ParameterValue::Str(s) => reserved.response_type = Some(s.clone()),
            _ => return Err(()),
        }
    }
    if let Some(value) = parameters.get("_path") {
        match value {
            ParameterValue::Str(s) => reserved.path = Some(s.clone()),
            _ => return Err(()),
        }
    }
    if let Some(value) = parameters.get("_times") {
        match value {
            ParameterValue::Int(i) => reserved.times = Some(*i),
            ParameterValue::Str(s) => reserved.times = Some(s.parse().map_err(|_| ())?),
            _ => return Err(()),
        }
    }

    Ok(reserved)
}

/// Apply the authorization rule chain to one request in place, returning
/// any logs emitted. Requests not in `Pending` status are left untouched.
pub fn authorize_one(
    request: &mut ApiCallRequest,
    config: &NodeConfig,
    endorsement: &dyn EndorsementSource,
) -> Vec<Log> {
    let mut logs = Vec::new();
    if request.status != RequestStatus::Pending {
        return logs;
    }

    // Step 1: trigger match.
    let endpoint_id = match request.endpoint_id {
        Some(id) => id,
        None => {
            request.status = RequestStatus::Ignored;
            return logs;
        }
    };
    let trigger = match config.trigger_for_endpoint(&endpoint_id) {
        Some(t) => t,
        None => {
            request.status = RequestStatus::Ignored;
            return logs;
        }
    };

    // Step 2: OIS resolution.
    let (_ois, _endpoint) = match config.resolve_trigger(trigger) {
        Some(resolved) => resolved,
        None => {
            request.status = RequestStatus::Errored;
            request.error_code = Some(RequestErrorCode::UnknownOIS);
            return logs;
        }
    };

    // Step 3: reserved parameters.
    if extract_reserved(&request.parameters).is_err() {
        request.status = RequestStatus::Errored;
        request.error_code = Some(RequestErrorCode::ReservedParametersInvalid);
        let log = Log::error(
            format!("request {} has malformed reserved parameters", request.id),
            None,
        );
        log.emit();
        logs.push(log);
        return logs;
    }

    // Step 4: endorsement.
    if let Some(requester_index) = request.requester_index {
        if !endorsement.is_endorsed(requester_index.0, &request.client_address) {
            request.status = RequestStatus::Errored;
            request.error_code = Some(RequestErrorCode::UnauthorizedClient);
            return logs;
        }
    }

    // Step 5: block-age, only relevant once a request has already been
    // marked `Blocked` by an earlier run; this stage never sets `Blocked`
    // itself (that is a disaggregator outcome) but it does retire stale
    // blocked requests.
    let age = request
        .metadata
        .current_block
        .saturating_sub(request.metadata.block_number);
    if age > request.metadata.ignore_blocked_requests_after_blocks
        && request.status == RequestStatus::Blocked
    {
        logs.push(Log::debug(format!(
            "dropping stale blocked request {} (age {age} blocks)",
            request.id
        )));
    }

    logs
}

/// Authorize a batch of requests in place.
pub fn authorize_all(
    requests: &mut [ApiCallRequest],
    config: &NodeConfig,
    endorsement: &dyn EndorsementSource,
) -> Vec<Log> {
    let mut logs = Vec::new();
    for request in requests.iter_mut() {
        logs.extend(authorize_one(request, config, endorsement));
    }
    logs
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_config::{Ois, OisEndpoint, Trigger};
    use ac_types::{EndpointId, ProviderId, RequestId, RequestKind, RequestMetadata, RequesterIndex};
    use std::collections::HashMap;

    struct AllowList(Vec<(u64, String)>);
    impl EndorsementSource for AllowList {
        fn is_endorsed(&self, requester_index: u64, client_address: &str) -> bool {
            self.0.iter().any(|(idx, addr)| *idx == requester_index && addr == client_address)
        }
    }

    fn config_with_trigger(endpoint_id: EndpointId) -> NodeConfig {
        NodeConfig {
            node_settings: None,
            triggers: vec![Trigger {
                endpoint_id,
                ois_title: "coinmarket".into(),
                endpoint_name: "price".into(),
            }],
            ois: vec![Ois {
                ois_format: "ois".into(),
                version: "1.0.0".into(),
                title: "coinmarket".into(),
                endpoints: vec![OisEndpoint {
                    name: "price".into(),
                    fixed_operation_parameters: HashMap::new(),
                    reserved_parameters: vec![],
                    parameters: vec!["coin".into()],
                }],
            }],
        }
    }

    fn request(endpoint_id: Option<EndpointId>, requester_index: Option<u64>) -> ApiCallRequest {
        ApiCallRequest {
            id: RequestId::from_bytes([1; 32]),
            kind: RequestKind::Full,
            status: RequestStatus::Pending,
            error_code: None,
            provider_id: ProviderId::from_bytes([2; 32]),
            requester_index: requester_index.map(RequesterIndex),
            client_address: "0xclient".into(),
            designated_wallet: None,
            fulfill_address: None,
            fulfill_function_id: None,
            endpoint_id,
            template_id: None,
            encoded_parameters: vec![],
            parameters: Parameters::new(),
            request_count: 0,
            metadata: RequestMetadata {
                block_number: 100,
                log_index: 0,
                current_block: 100,
                ignore_blocked_requests_after_blocks: 50,
                transaction_hash: [0; 32],
            },
            response_value: None,
            aggregated_call_id: None,
        }
    }

    #[test]
    fn unknown_endpoint_is_ignored() {
        let config = NodeConfig::default();
        let mut req = request(None, None);
        authorize_one(&mut req, &config, &AllowList(vec![]));
        assert_eq!(req.status, RequestStatus::Ignored);
    }

    #[test]
    fn endpoint_not_in_triggers_is_ignored() {
        let config = NodeConfig::default();
        let mut req = request(Some(EndpointId::from_bytes([9; 32])), None);
        authorize_one(&mut req, &config, &AllowList(vec![]));
        assert_eq!(req.status, RequestStatus::Ignored);
    }

    #[test]
    fn unendorsed_requester_is_errored() {
        let endpoint_id = EndpointId::from_bytes([9; 32]);
        let config = config_with_trigger(endpoint_id);
        let mut req = request(Some(endpoint_id), Some(7));
        authorize_one(&mut req, &config, &AllowList(vec![]));
        assert_eq!(req.status, RequestStatus::Errored);
        assert_eq!(req.error_code, Some(RequestErrorCode::UnauthorizedClient));
    }

    #[test]
    fn endorsed_requester_stays_pending() {
        let endpoint_id = EndpointId::from_bytes([9; 32]);
        let config = config_with_trigger(endpoint_id);
        let mut req = request(Some(endpoint_id), Some(7));
        let allow = AllowList(vec![(7, "0xclient".to_string())]);
        authorize_one(&mut req, &config, &allow);
        assert_eq!(req.status, RequestStatus::Pending);
    }

    #[test]
    fn malformed_reserved_parameter_is_errored() {
        let endpoint_id = EndpointId::from_bytes([9; 32]);
        let config = config_with_trigger(endpoint_id);
        let mut req = request(Some(endpoint_id), None);
        req.parameters.insert("_times".to_string(), ParameterValue::Str("not-a-number".to_string()));
        authorize_one(&mut req, &config, &AllowList(vec![]));
        assert_eq!(req.status, RequestStatus::Errored);
        assert_eq!(req.error_code, Some(RequestErrorCode::ReservedParametersInvalid));
    }
}
