//! # ac-types - Shared Request Lifecycle Entities
//!
//! Types shared by every stage of the request lifecycle engine: identifiers,
//! the closed `RequestStatus`/`RequestErrorCode` enumerations, the
//! `ApiCallRequest`/`WithdrawalRequest`/`AggregatedApiCall` entities, the
//! `ProviderState`/`CoordinatorState` snapshots, and the small amount of
//! ambient infrastructure (structured logs, the `go`-style retry helper)
//! every other crate in the workspace depends on.
//!
//! ## Module Structure
//!
//! ```text
//! ac-types/
//! ├── ids          # ProviderId, RequestId, TemplateId, EndpointId
//! ├── status        # RequestStatus, RequestErrorCode
//! ├── parameters    # ParameterValue, canonicalization, fingerprinting
//! ├── request       # ApiCallRequest, WithdrawalRequest, RequestMetadata
//! ├── aggregated    # AggregatedApiCall
//! ├── state         # ProviderState, CoordinatorState snapshots
//! ├── log           # Log, LogLevel
//! └── retry         # CoordinatorError, retry_with_backoff, OPERATION_RETRIES
//! ```

#![warn(missing_docs)]

pub mod aggregated;
pub mod ids;
pub mod log;
pub mod parameters;
pub mod request;
pub mod retry;
pub mod state;
pub mod status;

pub use aggregated::AggregatedApiCall;
pub use ids::{EndpointId, ProviderId, RequestId, RequesterIndex, TemplateId};
pub use log::{Log, LogLevel};
pub use parameters::{canonical_fingerprint, ParameterValue, Parameters};
pub use request::{ApiCallRequest, RequestKind, RequestMetadata, WithdrawalRequest};
pub use retry::{retry_with_backoff, CoordinatorError, OPERATION_RETRIES};
pub use state::{CoordinatorState, ProviderRequests, ProviderState};
pub use status::{RequestErrorCode, RequestStatus};

/// Crate version, re-exported for diagnostics.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
