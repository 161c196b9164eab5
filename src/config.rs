//! Pipeline configuration.
//!
//! [`PipelineConfig::default`] reproduces the sizing the channel reader has
//! always used: a deep line queue to absorb bursts from the channel daemon,
//! shallow message and error queues, warnings at 30% occupancy sampled every
//! three seconds, and lines of up to 2 MiB.

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};
use static_assertions::const_assert;
use thiserror::Error;

use crate::codec::MIN_LINE_LENGTH;

/// Default capacity of the raw line queue.
pub const DEFAULT_LINE_QUEUE_CAPACITY: usize = 10_000;
/// Default capacity of the decoded message queue.
pub const DEFAULT_MESSAGE_QUEUE_CAPACITY: usize = 100;
/// Default capacity of the error queue.
pub const DEFAULT_ERROR_QUEUE_CAPACITY: usize = 100;
/// Default occupancy fraction at which the monitor warns.
pub const DEFAULT_WARNING_FRACTION: f64 = 0.3;
/// Default queue sampling interval.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_secs(3);
/// Default initial capacity of the input read buffer.
pub const DEFAULT_INITIAL_LINE_CAPACITY: usize = 32 * 1024;
/// Default maximum length of one input line.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 2048 * 1024;
/// Default number of frames decoded concurrently.
pub const DEFAULT_DECODE_CONCURRENCY: usize = 64;

const_assert!(DEFAULT_INITIAL_LINE_CAPACITY <= DEFAULT_MAX_LINE_LENGTH);
const_assert!(MIN_LINE_LENGTH <= DEFAULT_MAX_LINE_LENGTH);
const_assert!(DEFAULT_MESSAGE_QUEUE_CAPACITY <= DEFAULT_LINE_QUEUE_CAPACITY);

/// The three bounded queues of the pipeline.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueueName {
    /// Raw input lines awaiting framing.
    Lines,
    /// Decoded messages awaiting the message handler.
    Messages,
    /// Errors awaiting the error handler.
    Errors,
}

impl QueueName {
    /// Label used in logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            QueueName::Lines => "lines",
            QueueName::Messages => "messages",
            QueueName::Errors => "errors",
        }
    }
}

impl fmt::Display for QueueName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// Sizing of one bounded queue.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct QueueConfig {
    /// Maximum number of queued items.
    pub capacity: usize,
    /// Occupancy, as a fraction of `capacity`, at which the monitor warns.
    pub warning_fraction: f64,
}

impl QueueConfig {
    /// Create a queue configuration.
    #[must_use]
    pub const fn new(capacity: usize, warning_fraction: f64) -> Self {
        Self {
            capacity,
            warning_fraction,
        }
    }

    /// Whether `occupancy` items reach the warning threshold.
    #[must_use]
    #[expect(
        clippy::cast_precision_loss,
        reason = "queue capacities are far below f64's exact integer range"
    )]
    pub fn is_over_threshold(&self, occupancy: usize) -> bool {
        occupancy as f64 >= self.capacity as f64 * self.warning_fraction
    }

    fn validate(&self, queue: QueueName) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidCapacity { queue });
        }
        if !(self.warning_fraction > 0.0 && self.warning_fraction <= 1.0) {
            return Err(ConfigError::InvalidWarningFraction {
                queue,
                fraction: self.warning_fraction,
            });
        }
        Ok(())
    }
}

/// Construction-time settings for a [`Pipeline`](crate::pipeline::Pipeline).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
///
/// use xymon_channels::config::{PipelineConfig, QueueConfig};
///
/// let config = PipelineConfig::default()
///     .message_queue(QueueConfig::new(500, 0.5))
///     .monitor_interval(Duration::from_secs(10))
///     .decode_concurrency(8);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Raw line queue.
    pub lines: QueueConfig,
    /// Decoded message queue.
    pub messages: QueueConfig,
    /// Error queue.
    pub errors: QueueConfig,
    /// Interval between queue occupancy samples.
    pub monitor_interval: Duration,
    /// Initial capacity of the input read buffer.
    pub initial_line_capacity: usize,
    /// Maximum length of one input line; longer lines stop the input.
    ///
    /// Must be at least [`MIN_LINE_LENGTH`].
    pub max_line_length: usize,
    /// Maximum number of frames decoded at the same time.
    pub decode_concurrency: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            lines: QueueConfig::new(DEFAULT_LINE_QUEUE_CAPACITY, DEFAULT_WARNING_FRACTION),
            messages: QueueConfig::new(DEFAULT_MESSAGE_QUEUE_CAPACITY, DEFAULT_WARNING_FRACTION),
            errors: QueueConfig::new(DEFAULT_ERROR_QUEUE_CAPACITY, DEFAULT_WARNING_FRACTION),
            monitor_interval: DEFAULT_MONITOR_INTERVAL,
            initial_line_capacity: DEFAULT_INITIAL_LINE_CAPACITY,
            max_line_length: DEFAULT_MAX_LINE_LENGTH,
            decode_concurrency: DEFAULT_DECODE_CONCURRENCY,
        }
    }
}

impl PipelineConfig {
    /// Set the raw line queue sizing.
    #[must_use]
    pub fn line_queue(mut self, queue: QueueConfig) -> Self {
        self.lines = queue;
        self
    }

    /// Set the decoded message queue sizing.
    #[must_use]
    pub fn message_queue(mut self, queue: QueueConfig) -> Self {
        self.messages = queue;
        self
    }

    /// Set the error queue sizing.
    #[must_use]
    pub fn error_queue(mut self, queue: QueueConfig) -> Self {
        self.errors = queue;
        self
    }

    /// Set the queue sampling interval.
    #[must_use]
    pub fn monitor_interval(mut self, interval: Duration) -> Self {
        self.monitor_interval = interval;
        self
    }

    /// Set the initial and maximum input buffer sizes.
    #[must_use]
    pub fn line_buffer(mut self, initial: usize, max: usize) -> Self {
        self.initial_line_capacity = initial;
        self.max_line_length = max;
        self
    }

    /// Set the number of frames decoded concurrently.
    #[must_use]
    pub fn decode_concurrency(mut self, limit: usize) -> Self {
        self.decode_concurrency = limit;
        self
    }

    /// Sizing of the named queue.
    #[must_use]
    pub fn queue(&self, name: QueueName) -> &QueueConfig {
        match name {
            QueueName::Lines => &self.lines,
            QueueName::Messages => &self.messages,
            QueueName::Errors => &self.errors,
        }
    }

    /// Check the configuration for values the pipeline cannot run with.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first invalid setting.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for name in [QueueName::Lines, QueueName::Messages, QueueName::Errors] {
            self.queue(name).validate(name)?;
        }
        if self.monitor_interval.is_zero() {
            return Err(ConfigError::ZeroMonitorInterval);
        }
        if self.decode_concurrency == 0 {
            return Err(ConfigError::ZeroDecodeConcurrency);
        }
        if self.max_line_length < MIN_LINE_LENGTH {
            return Err(ConfigError::MaxLineLengthTooSmall {
                max: self.max_line_length,
                min: MIN_LINE_LENGTH,
            });
        }
        if self.initial_line_capacity > self.max_line_length {
            return Err(ConfigError::LineBuffer {
                initial: self.initial_line_capacity,
                max: self.max_line_length,
            });
        }
        Ok(())
    }
}

/// Errors returned by [`PipelineConfig::validate`].
#[non_exhaustive]
#[derive(Clone, Debug, Error, PartialEq)]
pub enum ConfigError {
    /// A queue was configured with zero capacity.
    #[error("invalid capacity for {queue} queue; must be >= 1")]
    InvalidCapacity {
        /// Queue with the invalid capacity.
        queue: QueueName,
    },
    /// A warning fraction was outside `(0, 1]`.
    #[error("invalid warning fraction {fraction} for {queue} queue; must be in (0, 1]")]
    InvalidWarningFraction {
        /// Queue with the invalid fraction.
        queue: QueueName,
        /// Rejected fraction.
        fraction: f64,
    },
    /// The monitor interval was zero.
    #[error("monitor interval must be non-zero")]
    ZeroMonitorInterval,
    /// The decode concurrency limit was zero.
    #[error("decode concurrency must be >= 1")]
    ZeroDecodeConcurrency,
    /// The line cap was too small to hold a header line.
    #[error("max line length {max} is below the minimum of {min}")]
    MaxLineLengthTooSmall {
        /// Configured maximum line length.
        max: usize,
        /// Smallest accepted maximum line length.
        min: usize,
    },
    /// The initial input buffer is larger than the line cap.
    #[error("initial line buffer {initial} exceeds max line length {max}")]
    LineBuffer {
        /// Configured initial buffer capacity.
        initial: usize,
        /// Configured maximum line length.
        max: usize,
    },
}
