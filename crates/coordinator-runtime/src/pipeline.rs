//! # Pipeline Orchestration
//!
//! Wires components A-K end to end for one coordinator run: one struct
//! per configured chain provider bundling its collaborators, a
//! per-provider "prepare" stage run
//! with bounded concurrency, a barrier at
//! aggregation, bounded concurrent execution (fan-out 2), and a final
//! linear disaggregation/assembly/submission pass.

use crate::ports::ChainAdapter;
use crate::run_budget::RunBudget;
use ac_01_event_decoder::{decode_logs, RunContext};
use ac_02_request_builder::{build, resolve_templates, TemplateSource};
use ac_03_parameter_codec::apply_parameters;
use ac_04_request_store::{update_failed_requests, update_fulfilled_requests, update_fulfilled_withdrawals};
use ac_05_authorizer::{authorize_all, EndorsementSource};
use ac_06_aggregator::aggregate;
use ac_07_executor::{execute_all, ApiCaller};
use ac_08_disaggregator::disaggregate;
use ac_09_tx_assembler::{assemble, Transaction};
use ac_10_provider_init::{initialize_provider, ChainRpc, ProviderInitOutcome};
use ac_11_state_container::{
    create_coordinator_state, update_coordinator_state, update_provider_state, CoordinatorStatePartial,
    ProviderStatePartial,
};
use ac_config::NodeConfig;
use ac_crypto::MasterHDNode;
use ac_types::retry::retry_with_backoff;
use ac_types::{CoordinatorError, CoordinatorState, Log, ProviderId, ProviderRequests, ProviderState};
use std::collections::HashMap;
use std::sync::Arc;

/// One configured EVM provider's collaborators. Built by whatever external
/// wiring holds the concrete RPC/HTTP clients; this crate only needs the
/// trait objects.
pub struct ProviderRuntime {
    /// Chain id this provider connects to.
    pub chain_id: u64,
    /// Human-readable name, used for logging (matches `ChainProvider::name`).
    pub name: String,
    /// Admin address this node wants recorded on chain.
    pub desired_admin: String,
    /// Authorizer contract addresses this node wants recorded on chain.
    pub desired_authorizers: Vec<String>,
    /// Provider (re)initialization collaborator (4.J).
    pub chain_rpc: Arc<dyn ChainRpc>,
    /// Event fetch / nonce / gas price / submission collaborator.
    pub chain_adapter: Arc<dyn ChainAdapter>,
    /// Template lookup collaborator (4.B).
    pub template_source: Arc<dyn TemplateSource>,
    /// Endorsement lookup collaborator (4.E).
    pub endorsement_source: Arc<dyn EndorsementSource>,
}

/// Prepared per-provider state once fan-out 1 (init + event fetch) and the
/// pre-aggregation stages (B-E) have all run.
struct PreparedProvider {
    state: ProviderState,
    logs: Vec<Log>,
}

async fn prepare_provider(
    master: &MasterHDNode,
    config: &NodeConfig,
    runtime: &ProviderRuntime,
) -> Result<PreparedProvider, CoordinatorError> {
    let mut logs = Vec::new();

    let (provider_id, init_outcome, init_logs) = match initialize_provider(
        master,
        &runtime.desired_admin,
        &runtime.desired_authorizers,
        runtime.chain_rpc.as_ref(),
    )
    .await
    {
        Ok(result) => result,
        Err(CoordinatorError::MasterKeyDerivationFailed(reason)) => {
            // Shared across every provider; retrying per-provider cannot
            // help.
            return Err(CoordinatorError::MasterKeyDerivationFailed(reason));
        }
        Err(err) => {
            let log = Log::error(
                format!("provider {} initialization failed: {err}", runtime.name),
                Some(err.to_string()),
            );
            log.emit();
            // provider_id cannot be computed without the master node
            // succeeding, which it just did for other providers; fall
            // back to a zeroed id purely to label the empty snapshot.
            return Ok(PreparedProvider {
                state: ProviderState::empty(runtime.chain_id, runtime.name.clone(), ProviderId::from_bytes([0; 32])),
                logs: vec![log],
            });
        }
    };
    logs.extend(init_logs);
    if matches!(init_outcome, ProviderInitOutcome::Created { .. }) {
        logs.push(Log::info(format!("provider {} record created on chain", runtime.name)));
    }

    let (raw_logs, current_block) = match retry_with_backoff(|| runtime.chain_adapter.fetch_logs()).await {
        Ok(result) => result,
        Err(reason) => {
            let log = Log::error(format!("provider {} event fetch failed: {reason}", runtime.name), Some(reason));
            log.emit();
            return Ok(PreparedProvider {
                state: ProviderState::empty(runtime.chain_id, runtime.name.clone(), provider_id),
                logs: vec![log],
            });
        }
    };

    let ignore_blocked_after = config
        .node_settings
        .as_ref()
        .and_then(|settings| settings.chains.iter().find(|c| c.id == runtime.chain_id))
        .map(|c| c.ignore_blocked_requests_after_blocks)
        .unwrap_or(20);

    let ctx = RunContext { current_block, ignore_blocked_requests_after_blocks: ignore_blocked_after };
    let (decoded, decode_logs_out) = decode_logs(raw_logs, ctx);
    logs.extend(decode_logs_out);

    let (mut built, _) = build(decoded);

    for request in built.api_calls.iter_mut() {
        if let Some(log) = apply_parameters(request) {
            logs.push(log);
        }
    }
    logs.extend(resolve_templates(&mut built.api_calls, runtime.template_source.as_ref()));

    logs.extend(update_fulfilled_requests(&mut built.api_calls, &built.fulfilled_request_ids));
    logs.extend(update_failed_requests(&mut built.api_calls, &built.failed_request_ids));
    logs.extend(update_fulfilled_withdrawals(&mut built.withdrawals, &built.fulfilled_withdrawal_ids));

    logs.extend(authorize_all(&mut built.api_calls, config, runtime.endorsement_source.as_ref()));

    let requester_indices: Vec<_> = built
        .api_calls
        .iter()
        .filter_map(|r| r.requester_index)
        .chain(built.withdrawals.iter().map(|w| w.requester_index))
        .collect();
    let transaction_counts = match retry_with_backoff(|| runtime.chain_adapter.transaction_counts(&requester_indices)).await {
        Ok(counts) => counts,
        Err(reason) => {
            logs.push(Log::warn(format!(
                "provider {} transaction count lookup failed, nonces will default to 0: {reason}",
                runtime.name
            )));
            HashMap::new()
        }
    };
    let gas_price = match retry_with_backoff(|| runtime.chain_adapter.gas_price()).await {
        Ok(price) => price,
        Err(reason) => {
            logs.push(Log::warn(format!("provider {} gas price lookup failed, defaulting to 0: {reason}", runtime.name)));
            0
        }
    };

    let state = update_provider_state(
        ProviderState::empty(runtime.chain_id, runtime.name.clone(), provider_id),
        ProviderStatePartial {
            requests: Some(ProviderRequests { api_calls: built.api_calls, withdrawals: built.withdrawals }),
            transaction_counts_by_requester_index: Some(transaction_counts),
            current_block: Some(current_block),
            gas_price: Some(gas_price),
        },
    );

    Ok(PreparedProvider { state, logs })
}

/// One assembled transaction plus the provider it belongs to, ready for
/// submission.
pub struct SubmittedTransaction {
    /// Provider whose wallet submitted this transaction.
    pub provider_id: ProviderId,
    /// The assembled transaction.
    pub transaction: Transaction,
    /// Submission outcome: the transaction hash, or the failure reason.
    pub outcome: Result<[u8; 32], String>,
}

/// Run one full coordinator pass over every configured provider: J then
/// A-D-E per provider (bounded concurrent fan-out), F as a barrier, G
/// bounded concurrent fan-out, then H-I linearly per provider, followed by
/// transaction submission. Returns the final coordinator state, the
/// submitted transactions, and the run's aggregated log stream.
pub async fn run_once(
    config: &NodeConfig,
    master: &MasterHDNode,
    providers: &[ProviderRuntime],
    api_caller: Arc<dyn ApiCaller>,
    budget: RunBudget,
    max_provider_concurrency: usize,
) -> Result<(CoordinatorState, Vec<SubmittedTransaction>, Vec<Log>), CoordinatorError> {
    let mut logs = Vec::new();
    let semaphore = Arc::new(tokio::sync::Semaphore::new(max_provider_concurrency.max(1)));

    // Fan-out 1: J + A-D-E per provider, joined before aggregation.
    // `ProviderRuntime` borrows are not `'static`, so this runs as a bounded
    // concurrent stream rather than `tokio::spawn`/`JoinSet` (which would
    // require owned, `'static` futures). `buffer_unordered` completes
    // futures in whatever order they finish, not input order, so each
    // result is tagged with its original index and sorted back before
    // aggregation relies on provider order.
    use futures::stream::{self, StreamExt};
    let mut prepared: Vec<(usize, Result<PreparedProvider, CoordinatorError>)> =
        stream::iter(providers.iter().enumerate())
            .map(|(index, runtime)| {
                let semaphore = Arc::clone(&semaphore);
                async move {
                    let _permit = semaphore.acquire().await.expect("semaphore not closed");
                    (index, prepare_provider(master, config, runtime).await)
                }
            })
            .buffer_unordered(max_provider_concurrency.max(1))
            .collect()
            .await;
    prepared.sort_by_key(|(index, _)| *index);

    let mut provider_states = Vec::with_capacity(prepared.len());
    for (_, result) in prepared {
        match result {
            Ok(p) => {
                logs.extend(p.logs);
                provider_states.push(p.state);
            }
            Err(err) => return Err(err),
        }
    }

    let mut coordinator_state = update_coordinator_state(
        create_coordinator_state(),
        CoordinatorStatePartial { evm_providers: Some(provider_states), ..Default::default() },
    );

    if budget.is_exhausted() {
        logs.push(Log::warn("run budget exhausted before aggregation; aborting remaining submissions"));
        return Ok((coordinator_state, Vec::new(), logs));
    }

    // Barrier: F Aggregator needs every provider's Pending requests at once.
    let mut provider_request_lists: Vec<_> =
        coordinator_state.evm_providers.iter().map(|p| p.requests.api_calls.clone()).collect();
    let (mut aggregated, aggregate_logs) = aggregate(&mut provider_request_lists, config);
    logs.extend(aggregate_logs);
    for (provider, updated_requests) in coordinator_state.evm_providers.iter_mut().zip(provider_request_lists) {
        provider.requests.api_calls = updated_requests;
    }

    // Fan-out 2: G Executor, bounded concurrent, independent of H-I.
    logs.extend(execute_all(&mut aggregated, api_caller).await);

    coordinator_state = update_coordinator_state(
        coordinator_state,
        CoordinatorStatePartial { aggregated_api_calls_by_id: Some(aggregated.clone()), ..Default::default() },
    );

    if budget.is_exhausted() {
        logs.push(Log::warn("run budget exhausted before disaggregation; aborting remaining submissions"));
        return Ok((coordinator_state, Vec::new(), logs));
    }

    // H-I: linear per provider. Indexed rather than matched by provider id,
    // since two providers that both failed initialization fall back to the
    // same zeroed placeholder id (see `prepare_provider`) and would
    // otherwise collide under `replace_provider`'s id-based lookup.
    let mut submitted = Vec::new();
    for (index, runtime) in providers.iter().enumerate() {
        let Some(mut provider_state) = coordinator_state.evm_providers.get(index).cloned() else {
            continue;
        };

        logs.extend(disaggregate(&mut provider_state.requests.api_calls, &aggregated));
        coordinator_state.evm_providers[index] = provider_state.clone();

        let (transactions, assemble_logs) = assemble(&provider_state);
        logs.extend(assemble_logs);

        if budget.is_exhausted() {
            logs.push(Log::warn(format!(
                "run budget exhausted before submitting provider {} transactions; skipping",
                runtime.name
            )));
            continue;
        }

        for transaction in transactions {
            let outcome = retry_with_backoff(|| {
                runtime.chain_adapter.submit_transaction(provider_state.provider_id, &transaction)
            })
            .await;
            if let Err(reason) = &outcome {
                logs.push(Log::error(
                    format!("provider {} transaction submission failed: {reason}", runtime.name),
                    Some(reason.clone()),
                ));
            }
            submitted.push(SubmittedTransaction {
                provider_id: provider_state.provider_id,
                transaction,
                outcome,
            });
        }
    }

    Ok((coordinator_state, submitted, logs))
}
