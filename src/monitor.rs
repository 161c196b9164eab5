//! Periodic queue occupancy sampling.
//!
//! The monitor holds weak handles to the pipeline queues, so it never keeps
//! a queue open, and only reads occupancy. Each interval it emits one warning
//! per queue at or above its configured warning fraction.

use std::time::Duration;

use tokio::{
    sync::mpsc,
    time::{self, Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::{PipelineConfig, QueueConfig, QueueName};

trait Occupancy: Send + Sync {
    /// Items currently queued, or `None` once the queue has closed.
    fn occupancy(&self) -> Option<usize>;
}

impl<T: Send> Occupancy for mpsc::WeakSender<T> {
    fn occupancy(&self) -> Option<usize> {
        self.upgrade()
            .map(|sender| sender.max_capacity() - sender.capacity())
    }
}

struct Watched {
    queue: QueueName,
    config: QueueConfig,
    handle: Box<dyn Occupancy>,
}

/// One queue occupancy reading.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct QueueSample {
    /// Queue sampled.
    pub queue: QueueName,
    /// Items queued at sampling time.
    pub occupancy: usize,
    /// Queue capacity.
    pub capacity: usize,
    /// Whether the occupancy reached the warning threshold.
    pub over_threshold: bool,
}

/// Samples queue occupancy on a fixed interval.
///
/// # Examples
///
/// ```
/// use xymon_channels::config::{PipelineConfig, QueueName};
/// use xymon_channels::monitor::QueueMonitor;
///
/// let config = PipelineConfig::default();
/// let (tx, _rx) = tokio::sync::mpsc::channel::<String>(config.lines.capacity);
/// let monitor =
///     QueueMonitor::new(config.monitor_interval).watch(QueueName::Lines, config.lines, &tx);
///
/// let samples = monitor.sample();
/// assert_eq!(samples[0].occupancy, 0);
/// assert!(!samples[0].over_threshold);
/// ```
pub struct QueueMonitor {
    interval: Duration,
    watched: Vec<Watched>,
}

impl QueueMonitor {
    /// Create a monitor sampling every `interval`.
    #[must_use]
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            watched: Vec::new(),
        }
    }

    /// Create a monitor using the interval from `config`.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self { Self::new(config.monitor_interval) }

    /// Watch `sender`'s queue under `queue`, warning per `config`.
    #[must_use]
    pub fn watch<T: Send + 'static>(
        mut self,
        queue: QueueName,
        config: QueueConfig,
        sender: &mpsc::Sender<T>,
    ) -> Self {
        self.watched.push(Watched {
            queue,
            config,
            handle: Box::new(sender.downgrade()),
        });
        self
    }

    /// Read the occupancy of every open queue.
    #[must_use]
    pub fn sample(&self) -> Vec<QueueSample> {
        self.watched
            .iter()
            .filter_map(|watched| {
                let occupancy = watched.handle.occupancy()?;
                Some(QueueSample {
                    queue: watched.queue,
                    occupancy,
                    capacity: watched.config.capacity,
                    over_threshold: watched.config.is_over_threshold(occupancy),
                })
            })
            .collect()
    }

    /// Sample every interval until `shutdown` is cancelled.
    ///
    /// The first sample is taken one interval after the call. Returns the
    /// number of warnings emitted.
    pub async fn run(self, shutdown: CancellationToken) -> u64 {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut warnings = 0;
        loop {
            tokio::select! {
                biased;

                () = shutdown.cancelled() => break,
                _ = ticker.tick() => {}
            }
            for sample in self.sample() {
                debug!(
                    queue = %sample.queue,
                    occupancy = sample.occupancy,
                    capacity = sample.capacity,
                    "queue occupancy"
                );
                #[cfg(feature = "metrics")]
                crate::metrics::set_queue_depth(sample.queue, sample.occupancy);
                if sample.over_threshold {
                    warn!(
                        queue = %sample.queue,
                        occupancy = sample.occupancy,
                        capacity = sample.capacity,
                        "queue occupancy above warning threshold"
                    );
                    #[cfg(feature = "metrics")]
                    crate::metrics::inc_queue_warnings(sample.queue);
                    warnings += 1;
                }
            }
        }
        debug!(warnings, "queue monitor stopped");
        warnings
    }
}
