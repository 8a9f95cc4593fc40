//! # ac-config - Recognized Configuration Shapes
//!
//! Defines the configuration types the coordinator consumes. **Loading** configuration from
//! disk/env — file formats, secret plumbing, cloud-specific overrides — is
//! explicitly out of scope; this crate only carries the
//! `Deserialize`/`Default` shapes and a thin `from_json` convenience used
//! by tests and by whatever external loader hands the coordinator its
//! config.
//!
//! ## Shapes
//!
//! | Type | Recognized option |
//! |------|--------------------|
//! | `ChainConfig` | `nodeSettings.chains[]` |
//! | `NodeSettings` | `nodeSettings.{logFormat, cloudProvider, region, stage, nodeVersion}` |
//! | `Trigger` | `triggers.requests[]` |
//! | `Ois` | `ois[]` |

#![warn(missing_docs)]

use ac_types::EndpointId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Addresses of the two on-chain contracts the engine talks to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractAddresses {
    /// The Airnode contract (request/fulfill entry points).
    pub airnode: String,
    /// The Convenience contract (batched view calls).
    pub convenience: String,
}

/// One configured RPC endpoint backing a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProvider {
    /// Human-readable name, used for logging.
    pub name: String,
    /// JSON-RPC URL.
    pub url: String,
}

/// One configured EVM-compatible chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    /// Always `"evm"` today; kept as a string rather than an enum to
    /// leave the door open for future chain types.
    #[serde(rename = "type")]
    pub chain_type: String,
    /// Chain id.
    pub id: u64,
    /// Contract addresses on this chain.
    pub contracts: ContractAddresses,
    /// RPC providers for this chain; the engine fans out reads across them.
    pub providers: Vec<ChainProvider>,
    /// Age (in blocks) after which a `Blocked` request is dropped from the
    /// batch rather than carried forward. Kept
    /// per-chain since block times, and therefore a sensible staleness
    /// window, differ across chains.
    #[serde(default = "default_ignore_blocked_requests_after_blocks")]
    pub ignore_blocked_requests_after_blocks: u64,
}

fn default_ignore_blocked_requests_after_blocks() -> u64 {
    20
}

/// Structured-log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable text.
    Plain,
    /// Newline-delimited JSON.
    Json,
}

impl Default for LogFormat {
    fn default() -> Self {
        Self::Json
    }
}

/// Node-wide settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSettings {
    /// Configured chains.
    pub chains: Vec<ChainConfig>,
    /// Log output format.
    #[serde(default)]
    pub log_format: LogFormat,
    /// Deployment cloud provider, if any (informational only — deployment
    /// wrappers live outside this crate).
    #[serde(default)]
    pub cloud_provider: Option<String>,
    /// Deployment region, if any.
    #[serde(default)]
    pub region: Option<String>,
    /// Deployment stage label (e.g. `"production"`).
    #[serde(default)]
    pub stage: Option<String>,
    /// Node software version, surfaced in logs.
    #[serde(default)]
    pub node_version: Option<String>,
}

/// A trigger the node agrees to serve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trigger {
    /// Chain-registered endpoint hash.
    pub endpoint_id: EndpointId,
    /// Title of the OIS this trigger resolves against.
    pub ois_title: String,
    /// Name of the endpoint within that OIS.
    pub endpoint_name: String,
}

/// A reserved parameter declaration (`_type`, `_path`, `_times`, …).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedParameter {
    /// Reserved parameter name, e.g. `"_type"`.
    pub name: String,
    /// Fixed value the OIS pins this parameter to, if any. A fixed value
    /// always wins over a client-supplied one.
    #[serde(default)]
    pub fixed_value: Option<String>,
}

/// One endpoint within an OIS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OisEndpoint {
    /// Endpoint name, referenced by `Trigger::endpoint_name`.
    pub name: String,
    /// Parameters always sent regardless of client input.
    #[serde(default)]
    pub fixed_operation_parameters: HashMap<String, String>,
    /// Reserved parameter declarations for this endpoint.
    #[serde(default)]
    pub reserved_parameters: Vec<ReservedParameter>,
    /// Client-overridable parameter names this endpoint accepts.
    #[serde(default)]
    pub parameters: Vec<String>,
}

/// An Oracle Integration Specification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ois {
    /// Format marker (e.g. `"ois"`), carried through unvalidated — file
    /// format validation is out of scope.
    pub ois_format: String,
    /// OIS version string.
    pub version: String,
    /// OIS title, matched against `Trigger::ois_title`.
    pub title: String,
    /// Endpoints this OIS declares.
    pub endpoints: Vec<OisEndpoint>,
}

impl Ois {
    /// Find an endpoint by name.
    pub fn endpoint(&self, name: &str) -> Option<&OisEndpoint> {
        self.endpoints.iter().find(|e| e.name == name)
    }
}

/// The whole recognized configuration surface.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NodeConfig {
    /// `nodeSettings`.
    pub node_settings: Option<NodeSettings>,
    /// `triggers.requests[]`.
    #[serde(default)]
    pub triggers: Vec<Trigger>,
    /// `ois[]`.
    #[serde(default)]
    pub ois: Vec<Ois>,
}

impl NodeConfig {
    /// Parse a config already assembled into JSON by an external loader.
    /// This is a thin convenience, not a config-loading subsystem: no
    /// file-format detection, env var interpolation, or secret resolution
    /// happens here.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    /// Resolve a trigger's OIS endpoint, the first step of
    /// authorization's "OIS resolution".
    pub fn resolve_trigger(&self, trigger: &Trigger) -> Option<(&Ois, &OisEndpoint)> {
        let ois = self.ois.iter().find(|o| o.title == trigger.ois_title)?;
        let endpoint = ois.endpoint(&trigger.endpoint_name)?;
        Some((ois, endpoint))
    }

    /// Find the trigger configured for a given endpoint id, if any.
    pub fn trigger_for_endpoint(&self, endpoint_id: &EndpointId) -> Option<&Trigger> {
        self.triggers.iter().find(|t| &t.endpoint_id == endpoint_id)
    }
}

impl Default for NodeSettings {
    fn default() -> Self {
        Self {
            chains: Vec::new(),
            log_format: LogFormat::default(),
            cloud_provider: None,
            region: None,
            stage: None,
            node_version: None,
        }
    }
}
