//! # ac-11-state-container
//!
//! **Component:** 4.K State Container.
//!
//! `CoordinatorState` and `ProviderState` (defined in `ac-types::state`)
//! are immutable snapshots; this crate supplies the `create`/`update`
//! free functions over those concrete shapes, rather than a
//! generic `State`/reducer trait — every subsystem owns
//! its own concrete state shape and its own update functions.
//!
//! No hidden global variables: every pipeline stage receives a state
//! value and returns `(Vec<Log>, NewState)`; `update` never mutates its
//! input in place.

#![warn(missing_docs)]

use ac_types::{AggregatedApiCall, CoordinatorState, ProviderRequests, ProviderState, RequestId};
use std::collections::HashMap;

/// Construct the initial, empty coordinator state.
pub fn create_coordinator_state() -> CoordinatorState {
    CoordinatorState::new()
}

/// Fields of a [`CoordinatorState`] a stage may replace. `None` leaves the
/// corresponding field untouched.
#[derive(Debug, Clone, Default)]
pub struct CoordinatorStatePartial {
    /// Replacement provider list.
    pub evm_providers: Option<Vec<ProviderState>>,
    /// Replacement aggregation table.
    pub aggregated_api_calls_by_id: Option<HashMap<RequestId, AggregatedApiCall>>,
}

/// Merge `partial` onto `state`, returning a new snapshot. `state` is
/// consumed, not mutated in place, so the caller cannot accidentally
/// retain a stale alias.
pub fn update_coordinator_state(state: CoordinatorState, partial: CoordinatorStatePartial) -> CoordinatorState {
    CoordinatorState {
        evm_providers: partial.evm_providers.unwrap_or(state.evm_providers),
        aggregated_api_calls_by_id: partial
            .aggregated_api_calls_by_id
            .unwrap_or(state.aggregated_api_calls_by_id),
    }
}

/// Fields of a [`ProviderState`] a stage may replace.
#[derive(Debug, Clone, Default)]
pub struct ProviderStatePartial {
    /// Replacement request set.
    pub requests: Option<ProviderRequests>,
    /// Replacement per-requester transaction counts.
    pub transaction_counts_by_requester_index: Option<HashMap<ac_types::RequesterIndex, u64>>,
    /// Replacement chain head.
    pub current_block: Option<u64>,
    /// Replacement gas price.
    pub gas_price: Option<u64>,
}

/// Merge `partial` onto one provider's snapshot, returning a new one.
pub fn update_provider_state(state: ProviderState, partial: ProviderStatePartial) -> ProviderState {
    ProviderState {
        chain_id: state.chain_id,
        name: state.name,
        provider_id: state.provider_id,
        requests: partial.requests.unwrap_or(state.requests),
        transaction_counts_by_requester_index: partial
            .transaction_counts_by_requester_index
            .unwrap_or(state.transaction_counts_by_requester_index),
        current_block: partial.current_block.unwrap_or(state.current_block),
        gas_price: partial.gas_price.unwrap_or(state.gas_price),
    }
}

/// Replace one provider's snapshot within the coordinator state by
/// `provider_id`, leaving every other provider untouched. No-op if the
/// provider id is not present.
pub fn replace_provider(mut state: CoordinatorState, updated: ProviderState) -> CoordinatorState {
    if let Some(slot) = state.evm_providers.iter_mut().find(|p| p.provider_id == updated.provider_id) {
        *slot = updated;
    }
    state
}

#[cfg(test)]
mod tests {
    use super::*;
    use ac_types::ProviderId;

    #[test]
    fn create_yields_an_empty_state() {
        let state = create_coordinator_state();
        assert!(state.evm_providers.is_empty());
        assert!(state.aggregated_api_calls_by_id.is_empty());
    }

    #[test]
    fn update_replaces_only_the_given_field() {
        let state = create_coordinator_state();
        let providers = vec![ProviderState::empty(1, "mainnet", ProviderId::from_bytes([1; 32]))];

        let updated = update_coordinator_state(
            state,
            CoordinatorStatePartial { evm_providers: Some(providers.clone()), ..Default::default() },
        );

        assert_eq!(updated.evm_providers.len(), 1);
        assert!(updated.aggregated_api_calls_by_id.is_empty());
    }

    #[test]
    fn update_provider_state_preserves_identity_fields() {
        let provider = ProviderState::empty(5, "polygon", ProviderId::from_bytes([2; 32]));

        let updated = update_provider_state(
            provider,
            ProviderStatePartial { current_block: Some(123), gas_price: Some(50), ..Default::default() },
        );

        assert_eq!(updated.chain_id, 5);
        assert_eq!(updated.name, "polygon");
        assert_eq!(updated.current_block, 123);
        assert_eq!(updated.gas_price, 50);
    }

    #[test]
    fn replace_provider_swaps_the_matching_entry_only() {
        let provider_a = ProviderState::empty(1, "mainnet", ProviderId::from_bytes([1; 32]));
        let provider_b = ProviderState::empty(2, "polygon", ProviderId::from_bytes([2; 32]));
        let state = update_coordinator_state(
            create_coordinator_state(),
            CoordinatorStatePartial {
                evm_providers: Some(vec![provider_a, provider_b]),
                ..Default::default()
            },
        );

        let mut updated_b = ProviderState::empty(2, "polygon", ProviderId::from_bytes([2; 32]));
        updated_b.current_block = 999;

        let state = replace_provider(state, updated_b);

        assert_eq!(state.evm_providers[0].current_block, 0);
        assert_eq!(state.evm_providers[1].current_block, 999);
    }
}
