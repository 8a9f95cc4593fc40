//! # coordinator-runtime
//!
//! Wires components A-K into one coordinator run and exposes
//! the CLI entry point (`main.rs`) a serverless/cron wrapper invokes once
//! per trigger.

#![warn(missing_docs)]

pub mod pipeline;
pub mod ports;
pub mod run_budget;

pub use pipeline::{run_once, ProviderRuntime, SubmittedTransaction};
pub use ports::ChainAdapter;
pub use run_budget::RunBudget;
