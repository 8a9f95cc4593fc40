//! # ac-10-provider-init
//!
//! **Component:** 4.J Provider Initializer.
//!
//! Runs once per provider, before A–D: derives `providerId`/`xpub` from
//! the master HDNode, reads the on-chain provider record, and reconciles
//! it with configuration. Outbound chain access is behind
//! [`ChainRpc`], a trait with its own in-memory mock, so this component
//! is testable without a live RPC endpoint.

#![warn(missing_docs)]

use ac_crypto::MasterHDNode;
use ac_types::{retry::retry_with_backoff, CoordinatorError, Log, ProviderId, OPERATION_RETRIES};
use async_trait::async_trait;

/// The on-chain provider record as returned by `getProviderAndBlockNumber`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnChainProviderRecord {
    /// Admin address of record, empty if the provider does not yet exist.
    pub admin: String,
    /// Extended public key of record.
    pub xpub: String,
    /// Authorizer contract addresses of record.
    pub authorizers: Vec<String>,
    /// Chain head at the time of the read.
    pub block_number: u64,
}

impl OnChainProviderRecord {
    /// The sentinel the convenience contract returns for a provider id it
    /// has never seen.
    pub fn absent(block_number: u64) -> Self {
        Self { admin: String::new(), xpub: String::new(), authorizers: Vec::new(), block_number }
    }

    /// `true` if the convenience contract has no record for this provider.
    pub fn is_absent(&self) -> bool {
        self.xpub.is_empty()
    }
}

/// The record this node wants to see on chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DesiredProviderRecord {
    /// This node's xpub.
    pub xpub: String,
    /// Desired admin address.
    pub admin: String,
    /// Desired authorizer contract addresses.
    pub authorizers: Vec<String>,
}

/// Chain RPC surface needed to reconcile and (re)create a provider record
///. A single trait
/// covers both the view call and the write so a mock can keep them
/// consistent in tests.
#[async_trait]
pub trait ChainRpc: Send + Sync {
    /// `getProviderAndBlockNumber(providerId)`.
    async fn get_provider_and_block_number(&self, provider_id: ProviderId) -> Result<OnChainProviderRecord, String>;

    /// Current balance (wei) of the master wallet address.
    async fn wallet_balance(&self, address: &str) -> Result<u128, String>;

    /// Estimated gas cost (wei, already priced) of `createProvider`.
    async fn estimate_create_provider_cost(&self, desired: &DesiredProviderRecord) -> Result<u128, String>;

    /// Submit `createProvider(admin, xpub, authorizers)` sending
    /// `value = balance - cost`. Returns the submitted transaction hash.
    async fn submit_create_provider(
        &self,
        desired: &DesiredProviderRecord,
        value: u128,
    ) -> Result<[u8; 32], String>;
}

/// Outcome of initializing one provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderInitOutcome {
    /// The on-chain record already matched configuration; nothing submitted.
    UpToDate {
        /// Chain head observed during the read.
        block_number: u64,
    },
    /// A `createProvider` transaction was submitted.
    Created {
        /// Submitted transaction hash.
        transaction_hash: [u8; 32],
        /// Chain head observed during the read.
        block_number: u64,
    },
    /// The record is stale but funds were insufficient to update it; the
    /// node proceeds to serve requests with the existing record.
    StaleButUnderfunded {
        /// Chain head observed during the read.
        block_number: u64,
    },
}

/// Derive this node's `providerId`/`xpub` and reconcile the on-chain
/// record, retrying the RPC read `OPERATION_RETRIES` times.
pub async fn initialize_provider(
    master: &MasterHDNode,
    desired_admin: &str,
    desired_authorizers: &[String],
    rpc: &dyn ChainRpc,
) -> Result<(ProviderId, ProviderInitOutcome, Vec<Log>), CoordinatorError> {
    let provider_id = master
        .provider_id()
        .map_err(|e| CoordinatorError::MasterKeyDerivationFailed(e.to_string()))?;
    let xpub = master
        .xpub()
        .map_err(|e| CoordinatorError::MasterKeyDerivationFailed(e.to_string()))?;

    let record = retry_with_backoff(|| rpc.get_provider_and_block_number(provider_id))
        .await
        .map_err(|reason| CoordinatorError::ChainRpcExhausted { attempts: OPERATION_RETRIES, reason })?;

    let desired = DesiredProviderRecord {
        xpub: xpub.clone(),
        admin: desired_admin.to_string(),
        authorizers: desired_authorizers.to_vec(),
    };

    let mut logs = Vec::new();

    let up_to_date = !record.is_absent()
        && record.xpub == desired.xpub
        && record.admin == desired.admin
        && record.authorizers == desired.authorizers;

    if up_to_date {
        return Ok((provider_id, ProviderInitOutcome::UpToDate { block_number: record.block_number }, logs));
    }

    let master_wallet = master
        .master_wallet()
        .map_err(|e| CoordinatorError::MasterKeyDerivationFailed(e.to_string()))?;

    let cost = rpc
        .estimate_create_provider_cost(&desired)
        .await
        .map_err(|reason| CoordinatorError::ChainRpcExhausted { attempts: 1, reason })?;
    let balance = rpc
        .wallet_balance(&master_wallet.address)
        .await
        .map_err(|reason| CoordinatorError::ChainRpcExhausted { attempts: 1, reason })?;

    if balance >= cost {
        let value = balance - cost;
        let transaction_hash = rpc
            .submit_create_provider(&desired, value)
            .await
            .map_err(|reason| CoordinatorError::ChainRpcExhausted { attempts: 1, reason })?;

        return Ok((
            provider_id,
            ProviderInitOutcome::Created { transaction_hash, block_number: record.block_number },
            logs,
        ));
    }

    // Record exists with a matching xpub but stale admin/authorizers, and
    // funds are insufficient to correct it: exactly
    // three WARN logs, no transaction, the node proceeds with the stale
    // record.
    let balance_log = Log::warn(format!(
        "master wallet {} balance {} wei is insufficient to update provider record",
        master_wallet.address, balance
    ));
    let cost_log = Log::warn(format!("createProvider estimated cost is {cost} wei"));
    let consequence_log = Log::warn(format!(
        "provider {provider_id} will continue serving requests with its existing on-chain record; admin/authorizers could not be updated this run"
    ));

    for log in [balance_log, cost_log, consequence_log] {
        log.emit();
        logs.push(log);
    }

    Ok((provider_id, ProviderInitOutcome::StaleButUnderfunded { block_number: record.block_number }, logs))
}

/// An in-memory [`ChainRpc`] for tests. Left as a plain public module
/// (not `cfg(test)`) so `coordinator-runtime`'s integration tests can
/// reuse it.
pub mod mock {
    use super::*;
    use std::sync::Mutex;

    /// Scripted [`ChainRpc`] returning fixed responses.
    pub struct MockChainRpc {
        /// Record to hand back from `get_provider_and_block_number`.
        pub record: OnChainProviderRecord,
        /// Balance to hand back from `wallet_balance`.
        pub balance: u128,
        /// Cost to hand back from `estimate_create_provider_cost`.
        pub cost: u128,
        /// Transaction hash to hand back from `submit_create_provider`.
        pub submitted_hash: [u8; 32],
        /// Number of times `submit_create_provider` was called.
        pub submit_calls: Mutex<u32>,
    }

    #[async_trait]
    impl ChainRpc for MockChainRpc {
        async fn get_provider_and_block_number(&self, _provider_id: ProviderId) -> Result<OnChainProviderRecord, String> {
            Ok(self.record.clone())
        }

        async fn wallet_balance(&self, _address: &str) -> Result<u128, String> {
            Ok(self.balance)
        }

        async fn estimate_create_provider_cost(&self, _desired: &DesiredProviderRecord) -> Result<u128, String> {
            Ok(self.cost)
        }

        async fn submit_create_provider(
            &self,
            _desired: &DesiredProviderRecord,
            _value: u128,
        ) -> Result<[u8; 32], String> {
            *self.submit_calls.lock().expect("mock mutex poisoned") += 1;
            Ok(self.submitted_hash)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::mock::MockChainRpc;
    use super::*;
    use std::sync::Mutex;

    fn master() -> MasterHDNode {
        MasterHDNode::from_seed(b"provider init test seed material").unwrap()
    }

    #[tokio::test]
    async fn matching_record_needs_no_transaction() {
        let master = master();
        let xpub = master.xpub().unwrap();
        let rpc = MockChainRpc {
            record: OnChainProviderRecord {
                admin: "0xadmin".into(),
                xpub,
                authorizers: vec!["0xauth".into()],
                block_number: 42,
            },
            balance: 0,
            cost: 0,
            submitted_hash: [0; 32],
            submit_calls: Mutex::new(0),
        };

        let (_, outcome, logs) =
            initialize_provider(&master, "0xadmin", &["0xauth".to_string()], &rpc).await.unwrap();

        assert_eq!(outcome, ProviderInitOutcome::UpToDate { block_number: 42 });
        assert!(logs.is_empty());
        assert_eq!(*rpc.submit_calls.lock().unwrap(), 0);
    }

    #[tokio::test]
    async fn absent_record_is_created_when_funds_suffice() {
        let master = master();
        let rpc = MockChainRpc {
            record: OnChainProviderRecord::absent(10),
            balance: 1_000,
            cost: 100,
            submitted_hash: [7; 32],
            submit_calls: Mutex::new(0),
        };

        let (_, outcome, logs) =
            initialize_provider(&master, "0xadmin", &["0xauth".to_string()], &rpc).await.unwrap();

        assert!(logs.is_empty());
        match outcome {
            ProviderInitOutcome::Created { transaction_hash, block_number } => {
                assert_eq!(transaction_hash, [7; 32]);
                assert_eq!(block_number, 10);
            }
            other => panic!("expected Created, got {other:?}"),
        }
        assert_eq!(*rpc.submit_calls.lock().unwrap(), 1);
    }

    /// Scenario S6: stale record (matching xpub, differing authorizers),
    /// insufficient funds — no transaction, exactly three WARN logs.
    #[tokio::test]
    async fn stale_record_with_insufficient_funds_emits_three_warnings_and_no_transaction() {
        let master = master();
        let xpub = master.xpub().unwrap();
        let rpc = MockChainRpc {
            record: OnChainProviderRecord {
                admin: "0xadmin".into(),
                xpub,
                authorizers: vec!["0xstale-auth".into()],
                block_number: 99,
            },
            balance: 50,
            cost: 1_000,
            submitted_hash: [9; 32],
            submit_calls: Mutex::new(0),
        };

        let (_, outcome, logs) =
            initialize_provider(&master, "0xadmin", &["0xnew-auth".to_string()], &rpc).await.unwrap();

        assert_eq!(outcome, ProviderInitOutcome::StaleButUnderfunded { block_number: 99 });
        assert_eq!(logs.len(), 3);
        assert!(logs.iter().all(|l| matches!(l.level, ac_types::LogLevel::Warn)));
        assert_eq!(*rpc.submit_calls.lock().unwrap(), 0);
    }
}
