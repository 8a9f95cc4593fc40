//! # Outbound Collaborator Ports
//!
//! The pipeline stages in `ac-01`..`ac-11` are pure or depend only on
//! narrow collaborator traits (`ac_10_provider_init::ChainRpc`,
//! `ac_05_authorizer::EndorsementSource`, `ac_02_request_builder::TemplateSource`,
//! `ac_07_executor::ApiCaller`). This module adds the remaining outbound
//! surfaces the runtime needs to actually drive a provider end to end:
//! fetching raw logs, the run's chain head, batched transaction counts,
//! gas price, and submitting an assembled transaction. Every call here is
//! a suspension point — real implementations live outside this crate
//! (behind an ethers/web3-style client); this module stays trait-only
//! and lets the binary crate wire in a concrete adapter.

use ac_01_event_decoder::RawLog;
use ac_types::{ProviderId, RequesterIndex};
use ac_09_tx_assembler::Transaction;
use async_trait::async_trait;
use std::collections::HashMap;

/// Everything a pipeline run needs from one chain provider's RPC surface,
/// beyond provider (re)initialization (`ac_10_provider_init::ChainRpc`
/// covers that separately since it runs before this port is needed).
#[async_trait]
pub trait ChainAdapter: Send + Sync {
    /// Fetch every raw Airnode-relevant log emitted since the last run,
    /// plus the chain head observed at fetch time.
    async fn fetch_logs(&self) -> Result<(Vec<RawLog>, u64), String>;

    /// Batched on-chain transaction count per requester index's
    /// designated wallet.
    async fn transaction_counts(
        &self,
        requester_indices: &[RequesterIndex],
    ) -> Result<HashMap<RequesterIndex, u64>, String>;

    /// Current gas price (wei), a single oracle call.
    async fn gas_price(&self) -> Result<u64, String>;

    /// Submit one assembled transaction. Failures here are logged and do
    /// not abort peer transactions.
    async fn submit_transaction(
        &self,
        provider_id: ProviderId,
        transaction: &Transaction,
    ) -> Result<[u8; 32], String>;
}
