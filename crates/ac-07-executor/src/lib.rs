//! # ac-07-executor
//!
//! **Component:** 4.G Executor.
//!
//! Invokes the external API for each [`AggregatedApiCall`] through the
//! [`ApiCaller`] collaborator, with bounded parallel fan-out (a
//! `tokio::sync::Semaphore`-gated join set). One
//! call's failure never aborts the others — every result is captured as
//! either `response_value` or `error` on the call record, never as a
//! propagated error out of [`execute_all`].

#![warn(missing_docs)]

pub mod response;

pub use response::{encode_response, ResponseEncodeError};

use ac_05_authorizer::extract_reserved;
use ac_types::{AggregatedApiCall, EndpointId, Log, Parameters, RequestErrorCode, RequestId};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Default bound on concurrent in-flight external API calls per run.
/// Overridable via [`execute_all_with_concurrency`].
pub const DEFAULT_EXECUTOR_CONCURRENCY: usize = 10;

/// Raw response from one external API call, before `_type`/`_path`/`_times`
/// shaping into `responseValue` bytes.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Parsed JSON response body.
    pub data: serde_json::Value,
}

/// The external HTTP API, abstracted as `call(endpoint,
/// parameters) -> (data, statusCode)`. Realized here as a `Result` rather
/// than a status-code pair — exceptions never cross this boundary, only
/// values.
#[async_trait]
pub trait ApiCaller: Send + Sync {
    /// Invoke the endpoint with the given parameters.
    async fn call(&self, endpoint_id: EndpointId, parameters: &Parameters) -> Result<ApiResponse, String>;
}

/// Execute every [`AggregatedApiCall`] in `calls`, filling in
/// `response_value` or `error` in place. Uses [`DEFAULT_EXECUTOR_CONCURRENCY`].
pub async fn execute_all(
    calls: &mut HashMap<RequestId, AggregatedApiCall>,
    caller: Arc<dyn ApiCaller>,
) -> Vec<Log> {
    execute_all_with_concurrency(calls, caller, DEFAULT_EXECUTOR_CONCURRENCY).await
}

/// As [`execute_all`], with an explicit concurrency bound.
pub async fn execute_all_with_concurrency(
    calls: &mut HashMap<RequestId, AggregatedApiCall>,
    caller: Arc<dyn ApiCaller>,
    concurrency: usize,
) -> Vec<Log> {
    let semaphore = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut join_set = tokio::task::JoinSet::new();

    for (id, call) in calls.iter() {
        let id = *id;
        let endpoint_id = call.endpoint_id;
        let parameters = call.parameters.clone();
        let semaphore = Arc::clone(&semaphore);
        let caller = Arc::clone(&caller);

        join_set.spawn(async move {
            let _permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let result = caller.call(endpoint_id, &parameters).await;
            (id, result)
        });
    }

    let mut logs = Vec::new();
    while let Some(joined) = join_set.join_next().await {
        let (id, result) = joined.expect("executor task panicked");
        let Some(call) = calls.get_mut(&id) else { continue };

        match result {
            Ok(response) => match encode_call_response(call, &response) {
                Ok(bytes) => call.response_value = Some(bytes),
                Err(err) => {
                    call.error = Some(RequestErrorCode::ApiCallFailed);
                    let log = Log::error(
                        format!("aggregated call {id} response could not be encoded: {err}"),
                        Some(err.to_string()),
                    );
                    log.emit();
                    logs.push(log);
                }
            },
            Err(err) => {
                call.error = Some(RequestErrorCode::ApiCallFailed);
                let log = Log::error(format!("aggregated call {id} failed: {err}"), Some(err));
                log.emit();
                logs.push(log);
            }
        }
    }

    logs
}

fn encode_call_response(
    call: &AggregatedApiCall,
    response: &ApiResponse,
) -> Result<Vec<u8>, ResponseEncodeError> {
    let reserved = extract_reserved(&call.parameters).map_err(|_| ResponseEncodeError::MalformedReserved)?;
    encode_response(&response.data, &reserved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_types::{ParameterValue, RequestKind};

    struct StubCaller {
        response: Result<serde_json::Value, String>,
    }

    #[async_trait]
    impl ApiCaller for StubCaller {
        async fn call(&self, _endpoint_id: EndpointId, _parameters: &Parameters) -> Result<ApiResponse, String> {
            self.response
                .clone()
                .map(|data| ApiResponse { data })
                .map_err(|e| e)
        }
    }

    fn call_with(id_byte: u8, params: Parameters) -> AggregatedApiCall {
        AggregatedApiCall {
            id: RequestId::from_bytes([id_byte; 32]),
            endpoint_id: EndpointId::from_bytes([1; 32]),
            parameters: params,
            kind: RequestKind::Full,
            trigger: ("ois".into(), "endpoint".into()),
            response_value: None,
            error: None,
        }
    }

    #[tokio::test]
    async fn successful_call_sets_response_value() {
        let mut params = Parameters::new();
        params.insert("_type".to_string(), ParameterValue::Str("int256".to_string()));
        let mut calls = HashMap::new();
        calls.insert(RequestId::from_bytes([1; 32]), call_with(1, params));

        let caller: Arc<dyn ApiCaller> = Arc::new(StubCaller { response: Ok(serde_json::json!(42)) });
        let logs = execute_all(&mut calls, caller).await;

        assert!(logs.is_empty());
        let call = &calls[&RequestId::from_bytes([1; 32])];
        assert!(call.response_value.is_some());
        assert!(call.error.is_none());
    }

    #[tokio::test]
    async fn failed_call_sets_error_and_does_not_abort_others() {
        let mut calls = HashMap::new();
        calls.insert(RequestId::from_bytes([1; 32]), call_with(1, Parameters::new()));
        calls.insert(RequestId::from_bytes([2; 32]), call_with(2, Parameters::new()));

        let caller: Arc<dyn ApiCaller> = Arc::new(StubCaller { response: Err("upstream 500".to_string()) });
        let logs = execute_all(&mut calls, caller).await;

        assert_eq!(logs.len(), 2);
        for call in calls.values() {
            assert_eq!(call.error, Some(RequestErrorCode::ApiCallFailed));
            assert!(call.response_value.is_none());
        }
    }
}
