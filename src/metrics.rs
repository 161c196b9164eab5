//! Metric helpers for the channel pipeline.
//!
//! This module defines metric names and simple helper functions
//! wrapping the [`metrics`](https://docs.rs/metrics) crate. Nothing is
//! recorded until the embedding application installs a recorder.

use metrics::{counter, gauge};

use crate::{config::QueueName, protocol::MessageType};

/// Name of the counter tracking successfully decoded frames.
pub const FRAMES_DECODED: &str = "xymon_channel_frames_decoded_total";
/// Name of the counter tracking frames rejected by the decoder.
pub const DECODE_ERRORS: &str = "xymon_channel_decode_errors_total";
/// Name of the counter tracking unterminated frames that were discarded.
pub const FRAMES_ABANDONED: &str = "xymon_channel_frames_abandoned_total";
/// Name of the counter tracking message handler failures.
pub const HANDLER_ERRORS: &str = "xymon_channel_handler_errors_total";
/// Name of the gauge tracking sampled queue occupancy.
pub const QUEUE_DEPTH: &str = "xymon_channel_queue_depth";
/// Name of the counter tracking queue occupancy warnings.
pub const QUEUE_WARNINGS: &str = "xymon_channel_queue_warnings_total";

/// Record a decoded frame of the given type.
pub fn inc_frames_decoded(kind: MessageType) {
    counter!(FRAMES_DECODED, "type" => kind.as_str()).increment(1);
}

/// Record a frame the decoder rejected.
pub fn inc_decode_errors() { counter!(DECODE_ERRORS).increment(1); }

/// Record a discarded unterminated frame.
pub fn inc_frames_abandoned() { counter!(FRAMES_ABANDONED).increment(1); }

/// Record a message handler failure for the given type.
pub fn inc_handler_errors(kind: MessageType) {
    counter!(HANDLER_ERRORS, "type" => kind.as_str()).increment(1);
}

/// Publish the sampled occupancy of `queue`.
#[expect(
    clippy::cast_precision_loss,
    reason = "queue capacities are far below f64's exact integer range"
)]
pub fn set_queue_depth(queue: QueueName, occupancy: usize) {
    gauge!(QUEUE_DEPTH, "queue" => queue.as_str()).set(occupancy as f64);
}

/// Record a queue crossing its warning threshold.
pub fn inc_queue_warnings(queue: QueueName) {
    counter!(QUEUE_WARNINGS, "queue" => queue.as_str()).increment(1);
}
