//! # Coordinator Runtime — CLI Entry Point
//!
//! Runs one coordinator pass and exits. A serverless/cron wrapper is
//! expected to invoke this binary once per trigger and ship the emitted
//! log stream onward — that wrapper, and the
//! concrete chain RPC / external HTTP clients this run needs, are outside
//! this crate's scope. Until an operator wires in real
//! collaborators (see [`UnconfiguredChainAdapter`]), every provider is
//! skipped with a logged per-provider transient error and the run still
//! exits 0, with its subsystems stubbed out pending real wiring.

use ac_01_event_decoder::RawLog;
use ac_02_request_builder::{Template, TemplateSource};
use ac_05_authorizer::EndorsementSource;
use ac_07_executor::{ApiCaller, ApiResponse};
use ac_09_tx_assembler::Transaction;
use ac_config::{LogFormat, NodeConfig};
use ac_crypto::MasterHDNode;
use ac_types::{EndpointId, Parameters, ProviderId, RequesterIndex, TemplateId};
use anyhow::{Context, Result};
use async_trait::async_trait;
use coordinator_runtime::{run_once, ChainAdapter, ProviderRuntime, RunBudget};
use std::collections::HashMap;
use std::env;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, Level};

/// Wall-clock budget for one coordinator pass.
const RUN_BUDGET: Duration = Duration::from_secs(120);
/// Bound on concurrent per-provider initialization/event-fetch fan-out.
const MAX_PROVIDER_CONCURRENCY: usize = 8;

/// Placeholder collaborator used until an operator supplies a real chain
/// RPC client. Every call fails immediately so the affected provider is
/// skipped as a per-provider transient error, rather than the run hanging
/// on a collaborator that was never wired in.
struct UnconfiguredChainAdapter;

#[async_trait]
impl ChainAdapter for UnconfiguredChainAdapter {
    async fn fetch_logs(&self) -> Result<(Vec<RawLog>, u64), String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn transaction_counts(
        &self,
        _requester_indices: &[RequesterIndex],
    ) -> Result<HashMap<RequesterIndex, u64>, String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn gas_price(&self) -> Result<u64, String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn submit_transaction(&self, _provider_id: ProviderId, _transaction: &Transaction) -> Result<[u8; 32], String> {
        Err("no chain RPC client configured for this provider".to_string())
    }
}

#[async_trait]
impl ac_10_provider_init::ChainRpc for UnconfiguredChainAdapter {
    async fn get_provider_and_block_number(
        &self,
        _provider_id: ProviderId,
    ) -> Result<ac_10_provider_init::OnChainProviderRecord, String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn wallet_balance(&self, _address: &str) -> Result<u128, String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn estimate_create_provider_cost(
        &self,
        _desired: &ac_10_provider_init::DesiredProviderRecord,
    ) -> Result<u128, String> {
        Err("no chain RPC client configured for this provider".to_string())
    }

    async fn submit_create_provider(
        &self,
        _desired: &ac_10_provider_init::DesiredProviderRecord,
        _value: u128,
    ) -> Result<[u8; 32], String> {
        Err("no chain RPC client configured for this provider".to_string())
    }
}

/// An empty template table; every `templateId` lookup misses until an
/// operator wires in a real chain view-call client.
struct NoTemplates;
impl TemplateSource for NoTemplates {
    fn get(&self, _template_id: &TemplateId) -> Option<Template> {
        None
    }
}

/// Endorses nobody until an operator wires in the real batched
/// convenience call.
struct NoEndorsements;
impl EndorsementSource for NoEndorsements {
    fn is_endorsed(&self, _requester_index: u64, _client_address: &str) -> bool {
        false
    }
}

/// External API caller that always fails; an operator supplies a real
/// HTTP client — invocation of the external API is treated as an opaque
/// capability this crate never implements.
struct UnconfiguredApiCaller;

#[async_trait]
impl ApiCaller for UnconfiguredApiCaller {
    async fn call(&self, _endpoint_id: EndpointId, _parameters: &Parameters) -> Result<ApiResponse, String> {
        Err("no external API client configured".to_string())
    }
}

fn init_tracing(format: LogFormat) {
    let subscriber = tracing_subscriber::fmt().with_max_level(Level::INFO);
    match format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Plain => subscriber.init(),
    }
}

fn load_config(path: &str) -> Result<NodeConfig> {
    let text = fs::read_to_string(path).with_context(|| format!("reading config file {path}"))?;
    NodeConfig::from_json(&text).with_context(|| format!("parsing config file {path}"))
}

fn load_master_seed() -> Result<MasterHDNode> {
    let hex_seed = env::var("AIRNODE_MASTER_SEED_HEX")
        .context("AIRNODE_MASTER_SEED_HEX must be set to the node's master seed, hex-encoded")?;
    let seed = hex::decode(hex_seed.trim()).context("AIRNODE_MASTER_SEED_HEX is not valid hex")?;
    MasterHDNode::from_seed(&seed).map_err(|e| anyhow::anyhow!("failed to derive master HDNode: {e}"))
}

fn build_provider_runtimes(config: &NodeConfig) -> Vec<ProviderRuntime> {
    let Some(settings) = &config.node_settings else { return Vec::new() };
    settings
        .chains
        .iter()
        .map(|chain| {
            let adapter = Arc::new(UnconfiguredChainAdapter);
            ProviderRuntime {
                chain_id: chain.id,
                name: chain.providers.first().map(|p| p.name.clone()).unwrap_or_else(|| chain.id.to_string()),
                desired_admin: String::new(),
                desired_authorizers: Vec::new(),
                chain_rpc: adapter.clone(),
                chain_adapter: adapter,
                template_source: Arc::new(NoTemplates),
                endorsement_source: Arc::new(NoEndorsements),
            }
        })
        .collect()
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    let config_path = args.get(1).cloned().unwrap_or_else(|| "airnode-config.json".to_string());

    let config = match load_config(&config_path) {
        Ok(config) => config,
        Err(err) => {
            // Config loading itself is out of scope; a
            // malformed config is run-fatal.
            eprintln!("fatal: invalid configuration: {err:#}");
            std::process::exit(1);
        }
    };

    let log_format = config.node_settings.as_ref().map(|s| s.log_format).unwrap_or(LogFormat::Json);
    init_tracing(log_format);

    info!("Airnode coordinator run starting");

    let master = match load_master_seed() {
        Ok(master) => master,
        Err(err) => {
            error!("fatal: {err:#}");
            std::process::exit(1);
        }
    };

    let providers = build_provider_runtimes(&config);
    info!(provider_count = providers.len(), "configured providers");

    let budget = RunBudget::start(RUN_BUDGET);
    let api_caller: Arc<dyn ApiCaller> = Arc::new(UnconfiguredApiCaller);

    let (state, submitted, logs) =
        run_once(&config, &master, &providers, api_caller, budget, MAX_PROVIDER_CONCURRENCY).await?;

    for log in &logs {
        log.emit();
    }

    info!(
        providers = state.evm_providers.len(),
        aggregated_calls = state.aggregated_api_calls_by_id.len(),
        transactions_submitted = submitted.len(),
        "Airnode coordinator run finished"
    );

    Ok(())
}
