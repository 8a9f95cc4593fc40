//! # ac-01-event-decoder
//!
//! **Component:** 4.A Event Decoder.
//!
//! Classifies an ordered list of raw chain logs by event topic into the
//! seven event shapes the Airnode ABI emits. Unknown topics are dropped
//! with a `WARN` log rather than failing the batch. Ordering (block, then
//! log index) is guaranteed on the decoder's output regardless of the
//! order logs arrive in.

#![warn(missing_docs)]

pub mod events;
pub mod topics;

pub use events::{
    DecodedEvent, DecodedLog, EventMeta, FullRequestCreated, RegularRequestCreated,
    RequestFailed, RequestFulfilled, ShortRequestCreated, WithdrawalFulfilledEvent,
    WithdrawalRequestedEvent,
};
pub use topics::Topic;

use ac_types::Log;

/// One raw chain log, already split into its indexed topic and a
/// pre-structured payload. Full ABI byte-decoding of the Solidity log
/// encoding happens upstream of this engine (the chain RPC collaborator
/// is opaque); this component's job is the topic-based classification
/// and metadata attachment.
#[derive(Debug, Clone)]
pub struct RawLog {
    /// The log's indexed event topic (`topics[0]`).
    pub topic: Topic,
    /// Block the log was included in.
    pub block_number: u64,
    /// Index of the log within that block.
    pub log_index: u64,
    /// Hash of the transaction the log was emitted by.
    pub transaction_hash: [u8; 32],
    /// The already-structured event payload for this topic.
    pub payload: RawPayload,
}

/// Payload carried by a raw log, one variant per recognized topic.
#[derive(Debug, Clone)]
pub enum RawPayload {
    /// `ClientShortRequestCreated`.
    ShortRequestCreated(ShortRequestCreated),
    /// `ClientRequestCreated`.
    RegularRequestCreated(RegularRequestCreated),
    /// `ClientFullRequestCreated`.
    FullRequestCreated(FullRequestCreated),
    /// `ClientRequestFulfilled`.
    RequestFulfilled(RequestFulfilled),
    /// `ClientRequestFailed`.
    RequestFailed(RequestFailed),
    /// `WithdrawalRequested`.
    WithdrawalRequested(WithdrawalRequestedEvent),
    /// `WithdrawalFulfilled`.
    WithdrawalFulfilled(WithdrawalFulfilledEvent),
}

/// Per-run context every `RequestCreated` event is stamped with.
#[derive(Debug, Clone, Copy)]
pub struct RunContext {
    /// The run's current chain head.
    pub current_block: u64,
    /// Configured age (in blocks) after which a `Blocked` request is dropped.
    pub ignore_blocked_requests_after_blocks: u64,
}

/// Classify and order a batch of raw logs. Unknown topics are skipped
/// with a `WARN` log; known topics decode into a `DecodedLog` carrying
/// both the typed event and its metadata.
pub fn decode_logs(mut logs: Vec<RawLog>, ctx: RunContext) -> (Vec<DecodedLog>, Vec<Log>) {
    logs.sort_by_key(|log| (log.block_number, log.log_index));

    let mut decoded = Vec::with_capacity(logs.len());
    let mut stage_logs = Vec::new();

    for log in logs {
        match decode_one(&log, ctx) {
            Some(decoded_log) => decoded.push(decoded_log),
            None => {
                let entry = Log::warn(format!(
                    "unknown event topic {:?} at block {} log {}; ignoring",
                    log.topic, log.block_number, log.log_index
                ));
                entry.emit();
                stage_logs.push(entry);
            }
        }
    }

    (decoded, stage_logs)
}

fn decode_one(log: &RawLog, ctx: RunContext) -> Option<DecodedLog> {
    let meta = EventMeta {
        block_number: log.block_number,
        log_index: log.log_index,
        transaction_hash: log.transaction_hash,
        current_block: ctx.current_block,
        ignore_blocked_requests_after_blocks: ctx.ignore_blocked_requests_after_blocks,
    };

    let event = match (&log.topic, &log.payload) {
        (Topic::ClientShortRequestCreated, RawPayload::ShortRequestCreated(p)) => {
            DecodedEvent::ClientShortRequestCreated(p.clone())
        }
        (Topic::ClientRequestCreated, RawPayload::RegularRequestCreated(p)) => {
            DecodedEvent::ClientRequestCreated(p.clone())
        }
        (Topic::ClientFullRequestCreated, RawPayload::FullRequestCreated(p)) => {
            DecodedEvent::ClientFullRequestCreated(p.clone())
        }
        (Topic::ClientRequestFulfilled, RawPayload::RequestFulfilled(p)) => {
            DecodedEvent::ClientRequestFulfilled(p.clone())
        }
        (Topic::ClientRequestFailed, RawPayload::RequestFailed(p)) => {
            DecodedEvent::ClientRequestFailed(p.clone())
        }
        (Topic::WithdrawalRequested, RawPayload::WithdrawalRequested(p)) => {
            DecodedEvent::WithdrawalRequested(p.clone())
        }
        (Topic::WithdrawalFulfilled, RawPayload::WithdrawalFulfilled(p)) => {
            DecodedEvent::WithdrawalFulfilled(p.clone())
        }
        // A topic/payload mismatch means the upstream log source is
        // misbehaving; treat it the same as an unrecognized topic rather
        // than panic.
        _ => return None,
    };

    Some(DecodedLog { event, meta })
}
