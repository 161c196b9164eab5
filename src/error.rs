//! Canonical error types for the crate.
//!
//! [`ChannelError`] is what the error handler observes: per-frame decode
//! failures, handler failures and abandoned frames. [`PipelineError`] is what
//! [`Pipeline::run`](crate::pipeline::Pipeline::run) returns to its caller.

use thiserror::Error;

use crate::{
    codec::ReadError,
    config::ConfigError,
    decode::DecodeError,
    frame::RawFrame,
    protocol::MessageType,
};

/// Error returned by a message handler.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// An error observation delivered to the error handler.
///
/// None of these stop the pipeline; each one accounts for exactly one frame
/// or message that did not reach the message handler successfully.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// A frame failed to decode.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The message handler rejected a decoded message.
    #[error("{kind} message handler failed: {source}")]
    Handler {
        /// Type of the message being handled.
        kind: MessageType,
        /// Error returned by the handler.
        source: HandlerError,
    },

    /// A frame was discarded before its terminator arrived, either because a
    /// new header started or because the input ended.
    #[error(
        "discarded unterminated frame of {} lines starting {:?}",
        .frame.len(),
        first_line(.frame)
    )]
    AbandonedFrame {
        /// Lines accumulated before the frame was discarded.
        frame: RawFrame,
    },
}

fn first_line(frame: &RawFrame) -> &str { frame.lines().first().map_or("", String::as_str) }

impl ChannelError {
    /// Raw header line of the affected frame, when known.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        match self {
            ChannelError::Decode(err) => err.header(),
            ChannelError::AbandonedFrame { frame } => frame.header(),
            ChannelError::Handler { .. } => None,
        }
    }
}

/// Errors returned by [`Pipeline`](crate::pipeline::Pipeline).
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The configuration was rejected.
    #[error("invalid pipeline configuration: {0}")]
    Config(#[from] ConfigError),

    /// Reading the input failed. Everything read before the failure has been
    /// processed.
    #[error("line source stopped: {0}")]
    Read(#[from] ReadError),

    /// A pipeline task panicked, typically inside the error handler.
    #[error("pipeline task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
