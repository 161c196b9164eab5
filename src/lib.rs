#![doc(html_root_url = "https://docs.rs/xymon_channels/latest")]
//! Decoder for Xymon channel feeds.
//!
//! A channel is a stream of text lines carrying framed monitoring messages.
//! [`Pipeline`] reads the stream, groups lines into frames, decodes each
//! frame into a typed [`Message`] and hands messages and errors to two
//! caller-supplied handlers, with bounded queues between every stage.

pub mod codec;
pub mod config;
pub mod decode;
pub mod dispatch;
pub mod error;
pub mod frame;
pub mod message;
#[cfg(feature = "metrics")]
pub mod metrics;
pub mod monitor;
pub mod pipeline;
pub mod pool;
pub mod protocol;
pub mod source;

pub use codec::{LineCodec, ReadError};
pub use config::{ConfigError, PipelineConfig, QueueConfig, QueueName};
pub use decode::{DecodeError, TimestampError, decode_frame};
pub use dispatch::{ErrorHandler, MessageHandler};
pub use error::{ChannelError, HandlerError, PipelineError};
pub use frame::RawFrame;
pub use message::{Details, Message, Timestamp};
pub use pipeline::{Pipeline, PipelineReport};
pub use protocol::MessageType;
