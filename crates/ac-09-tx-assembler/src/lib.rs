//! # ac-09-tx-assembler
//!
//! **Component:** 4.I Transaction Assembler.
//!
//! Per provider, groups `apiCalls` and `withdrawals` by `requesterIndex`,
//! sorts each group deterministically by `(blockNumber, logIndex)`, and
//! assigns sequential nonces starting at that requester's on-chain
//! transaction count. `Fulfilled`, `Ignored`,
//! and `Blocked` requests produce no transaction (invariant 3/4).

#![warn(missing_docs)]

use ac_types::{ApiCallRequest, Log, ProviderState, RequestId, RequestStatus, RequesterIndex, WithdrawalRequest};
use std::collections::BTreeMap;

/// Gas limit estimates. Live gas estimation is out of scope;
/// these are fixed per-action-kind budgets, generous enough for the
/// Airnode contract's `fulfill`/`fail`/`fulfillWithdrawal` entry points.
pub const FULFILL_GAS_LIMIT: u64 = 300_000;
/// Gas limit for a `fail` transaction.
pub const FAIL_GAS_LIMIT: u64 = 100_000;
/// Gas limit for a `fulfillWithdrawal` transaction.
pub const WITHDRAWAL_GAS_LIMIT: u64 = 60_000;

/// One assembled on-chain call, not yet signed or submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionKind {
    /// `fulfill(requestId, providerId, statusCode=0, data, fulfillAddress, fulfillFunctionId)`.
    Fulfill {
        /// Request being fulfilled.
        request_id: RequestId,
        /// ABI-encoded response data.
        data: Vec<u8>,
        /// Address the fulfill transaction calls back into.
        fulfill_address: String,
        /// 4-byte selector the fulfill transaction calls.
        fulfill_function_id: [u8; 4],
    },
    /// `fail(requestId, providerId, statusCode)`. `statusCode` is always
    /// non-zero.
    Fail {
        /// Request being failed.
        request_id: RequestId,
        /// Non-zero status code derived from the request's error code.
        status_code: u16,
    },
    /// `fulfillWithdrawal(requestId, providerId, destination)`.
    FulfillWithdrawal {
        /// Withdrawal being fulfilled.
        request_id: RequestId,
        /// Destination address for the withdrawn funds.
        destination: String,
    },
}

impl TransactionKind {
    /// Gas limit budget for this action kind.
    pub fn gas_limit(&self) -> u64 {
        match self {
            Self::Fulfill { .. } => FULFILL_GAS_LIMIT,
            Self::Fail { .. } => FAIL_GAS_LIMIT,
            Self::FulfillWithdrawal { .. } => WITHDRAWAL_GAS_LIMIT,
        }
    }
}

/// A fully assembled transaction, ready for signing and submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    /// Requester index whose designated wallet submits this transaction.
    pub requester_index: RequesterIndex,
    /// Sequential nonce within `requester_index`'s wallet.
    pub nonce: u64,
    /// Run's gas price (wei).
    pub gas_price: u64,
    /// The action this transaction performs.
    pub kind: TransactionKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct SortKey(u64, u64);

struct PendingAction {
    requester_index: RequesterIndex,
    sort_key: SortKey,
    kind: TransactionKind,
}

fn api_call_action(request: &ApiCallRequest) -> Option<PendingAction> {
    let requester_index = request.requester_index?;
    let sort_key = SortKey(request.metadata.block_number, request.metadata.log_index);

    let kind = match request.status {
        RequestStatus::Pending if request.response_value.is_some() => TransactionKind::Fulfill {
            request_id: request.id,
            data: request.response_value.clone().unwrap_or_default(),
            fulfill_address: request.fulfill_address.clone()?,
            fulfill_function_id: request.fulfill_function_id?,
        },
        RequestStatus::Errored => TransactionKind::Fail {
            request_id: request.id,
            status_code: request.error_code.map(|c| c.status_code()).unwrap_or(u16::MAX),
        },
        _ => return None,
    };

    Some(PendingAction { requester_index, sort_key, kind })
}

fn withdrawal_action(withdrawal: &WithdrawalRequest) -> Option<PendingAction> {
    if withdrawal.status != RequestStatus::Pending {
        return None;
    }
    Some(PendingAction {
        requester_index: withdrawal.requester_index,
        sort_key: SortKey(withdrawal.metadata.block_number, withdrawal.metadata.log_index),
        kind: TransactionKind::FulfillWithdrawal {
            request_id: withdrawal.id,
            destination: withdrawal.destination.clone(),
        },
    })
}

/// Assemble every transaction for one provider, in deterministic
/// `(requesterIndex, blockNumber, logIndex)` order with strictly
/// increasing nonces per requester (invariant 5).
pub fn assemble(provider: &ProviderState) -> (Vec<Transaction>, Vec<Log>) {
    let mut by_requester: BTreeMap<RequesterIndex, Vec<PendingAction>> = BTreeMap::new();
    let mut logs = Vec::new();

    for request in &provider.requests.api_calls {
        let would_transact = request.status == RequestStatus::Errored
            || (request.status == RequestStatus::Pending && request.response_value.is_some());

        match api_call_action(request) {
            Some(action) => by_requester.entry(action.requester_index).or_default().push(action),
            None if would_transact => {
                let log = Log::warn(format!(
                    "request {} cannot be assembled: requester index or fulfillment routing unresolved",
                    request.id
                ));
                log.emit();
                logs.push(log);
            }
            None => {}
        }
    }

    for withdrawal in &provider.requests.withdrawals {
        if let Some(action) = withdrawal_action(withdrawal) {
            by_requester.entry(action.requester_index).or_default().push(action);
        }
    }

    let mut transactions = Vec::new();
    for (requester_index, mut actions) in by_requester {
        actions.sort_by_key(|a| a.sort_key);
        let starting_nonce = provider
            .transaction_counts_by_requester_index
            .get(&requester_index)
            .copied()
            .unwrap_or(0);

        for (offset, action) in actions.into_iter().enumerate() {
            transactions.push(Transaction {
                requester_index,
                nonce: starting_nonce + offset as u64,
                gas_price: provider.gas_price,
                kind: action.kind,
            });
        }
    }

    (transactions, logs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_types::{
        EndpointId, Parameters, ProviderId, ProviderRequests, RequestErrorCode, RequestKind,
        RequestMetadata,
    };

    fn meta(block: u64, log_index: u64) -> RequestMetadata {
        RequestMetadata {
            block_number: block,
            log_index,
            current_block: block,
            ignore_blocked_requests_after_blocks: 50,
            transaction_hash: [0; 32],
        }
    }

    fn fulfillable_request(id_byte: u8, requester: u64, block: u64, log_index: u64) -> ApiCallRequest {
        ApiCallRequest {
            id: RequestId::from_bytes([id_byte; 32]),
            kind: RequestKind::Full,
            status: RequestStatus::Pending,
            error_code: None,
            provider_id: ProviderId::from_bytes([1; 32]),
            requester_index: Some(RequesterIndex(requester)),
            client_address: "0xclient".into(),
            designated_wallet: Some("0xwallet".into()),
            fulfill_address: Some("0xfulfill".into()),
            fulfill_function_id: Some([1, 2, 3, 4]),
            endpoint_id: Some(EndpointId::from_bytes([9; 32])),
            template_id: None,
            encoded_parameters: vec![],
            parameters: Parameters::new(),
            request_count: 0,
            metadata: meta(block, log_index),
            response_value: Some(vec![0xAB]),
            aggregated_call_id: None,
        }
    }

    fn provider_with(api_calls: Vec<ApiCallRequest>, start_nonce: u64) -> ProviderState {
        let mut counts = std::collections::HashMap::new();
        for req in &api_calls {
            if let Some(idx) = req.requester_index {
                counts.insert(idx, start_nonce);
            }
        }
        ProviderState {
            chain_id: 1,
            name: "mainnet".into(),
            provider_id: ProviderId::from_bytes([1; 32]),
            requests: ProviderRequests { api_calls, withdrawals: vec![] },
            transaction_counts_by_requester_index: counts,
            current_block: 100,
            gas_price: 20_000_000_000,
        }
    }

    #[test]
    fn fulfillable_request_becomes_a_fulfill_transaction() {
        let provider = provider_with(vec![fulfillable_request(1, 7, 10, 0)], 5);
        let (txs, logs) = assemble(&provider);

        assert!(logs.is_empty());
        assert_eq!(txs.len(), 1);
        assert_eq!(txs[0].nonce, 5);
        assert!(matches!(txs[0].kind, TransactionKind::Fulfill { .. }));
    }

    #[test]
    fn nonces_are_contiguous_and_strictly_increasing_per_requester() {
        let requests = vec![
            fulfillable_request(1, 7, 10, 2),
            fulfillable_request(2, 7, 10, 0),
            fulfillable_request(3, 7, 11, 0),
        ];
        let provider = provider_with(requests, 3);
        let (txs, _) = assemble(&provider);

        let nonces: Vec<u64> = txs.iter().map(|t| t.nonce).collect();
        assert_eq!(nonces, vec![3, 4, 5]);
        // sorted by (block, log_index): request 2 (10,0) then 1 (10,2) then 3 (11,0)
        match &txs[0].kind {
            TransactionKind::Fulfill { request_id, .. } => {
                assert_eq!(*request_id, RequestId::from_bytes([2; 32]));
            }
            _ => panic!("expected fulfill"),
        }
    }

    #[test]
    fn fulfilled_request_produces_no_transaction() {
        let mut req = fulfillable_request(1, 7, 10, 0);
        req.status = RequestStatus::Fulfilled;
        let provider = provider_with(vec![req], 0);
        let (txs, _) = assemble(&provider);
        assert!(txs.is_empty());
    }

    #[test]
    fn errored_request_produces_a_fail_transaction_with_a_nonzero_status_code() {
        let mut req = fulfillable_request(1, 7, 10, 0);
        req.status = RequestStatus::Errored;
        req.error_code = Some(RequestErrorCode::ApiCallFailed);
        req.response_value = None;
        let provider = provider_with(vec![req], 0);
        let (txs, _) = assemble(&provider);

        assert_eq!(txs.len(), 1);
        match &txs[0].kind {
            TransactionKind::Fail { status_code, .. } => assert_ne!(*status_code, 0),
            _ => panic!("expected fail"),
        }
    }

    #[test]
    fn blocked_request_produces_no_transaction() {
        let mut req = fulfillable_request(1, 7, 10, 0);
        req.status = RequestStatus::Blocked;
        req.response_value = None;
        let provider = provider_with(vec![req], 0);
        let (txs, _) = assemble(&provider);
        assert!(txs.is_empty());
    }
}
