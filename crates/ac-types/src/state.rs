//! # State Snapshots
//!
//! Immutable per-run snapshots. These structs hold data
//! only; the reducer-style `update` functions that produce new snapshots
//! live in `ac-11-state-container` so this crate stays a pure data
//! dependency for every pipeline stage.

use crate::aggregated::AggregatedApiCall;
use crate::ids::{ProviderId, RequestId, RequesterIndex};
use crate::request::{ApiCallRequest, WithdrawalRequest};
use std::collections::HashMap;

/// A provider's requests, split by kind the way the Request Store groups
/// them.
#[derive(Debug, Clone, Default)]
pub struct ProviderRequests {
    /// API-call requests observed on this provider.
    pub api_calls: Vec<ApiCallRequest>,
    /// Withdrawal requests observed on this provider.
    pub withdrawals: Vec<WithdrawalRequest>,
}

/// Snapshot of one EVM provider's state for the current run.
#[derive(Debug, Clone)]
pub struct ProviderState {
    /// Chain id this provider connects to.
    pub chain_id: u64,
    /// Configured provider name (matches `nodeSettings.chains[].providers[]`).
    pub name: String,
    /// This node's provider id on this chain.
    pub provider_id: ProviderId,
    /// Requests observed this run, grouped by kind.
    pub requests: ProviderRequests,
    /// On-chain transaction count per requester index, fetched once per run.
    pub transaction_counts_by_requester_index: HashMap<RequesterIndex, u64>,
    /// Chain head at the start of this run.
    pub current_block: u64,
    /// Gas price to use for this run's transactions (wei).
    pub gas_price: u64,
}

impl ProviderState {
    /// An empty snapshot, used when provider initialization or event fetch
    /// fails after retries and downstream stages must skip the provider
    ///.
    pub fn empty(chain_id: u64, name: impl Into<String>, provider_id: ProviderId) -> Self {
        Self {
            chain_id,
            name: name.into(),
            provider_id,
            requests: ProviderRequests::default(),
            transaction_counts_by_requester_index: HashMap::new(),
            current_block: 0,
            gas_price: 0,
        }
    }
}

/// Snapshot of the whole coordinator run: every provider plus the
/// cross-provider aggregation table.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorState {
    /// One entry per configured EVM provider.
    pub evm_providers: Vec<ProviderState>,
    /// `aggregatedCallId -> AggregatedApiCall`, populated by the aggregator.
    pub aggregated_api_calls_by_id: HashMap<RequestId, AggregatedApiCall>,
}

impl CoordinatorState {
    /// Construct the initial (empty) coordinator state.
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_coordinator_state_has_no_providers() {
        let state = CoordinatorState::new();
        assert!(state.evm_providers.is_empty());
        assert!(state.aggregated_api_calls_by_id.is_empty());
    }

    #[test]
    fn empty_provider_state_has_no_requests() {
        let state = ProviderState::empty(1, "mainnet", ProviderId::from_bytes([1; 32]));
        assert!(state.requests.api_calls.is_empty());
        assert!(state.requests.withdrawals.is_empty());
    }
}
