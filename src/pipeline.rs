//! Pipeline wiring: source, assembler, decoder pool, dispatch and monitor.
//!
//! ```text
//! input ─▶ LineSource ─▶ [lines] ─▶ assembler ─▶ DecoderPool ─┬▶ [messages] ─▶ message handler
//!                                        │                    └▶ [errors] ◀─────────┘ failures
//!                                        └── abandoned frames ─▶ [errors] ─▶ error handler
//! ```
//!
//! Shutdown runs front to back. The source stops reading, which closes the
//! line queue; the assembler drains it and waits for in-flight decodes; the
//! message and error queues then close once their workers have dispatched
//! every queued item. The monitor is cancelled last.

use std::future::{self, Future};

use tokio::{io::AsyncRead, sync::mpsc};
use tokio_util::{sync::CancellationToken, task::TaskTracker};
use tracing::{debug, info, warn};

use crate::{
    config::{PipelineConfig, QueueName},
    dispatch::{ErrorHandler, MessageHandler, error_worker, message_worker},
    error::{ChannelError, PipelineError},
    frame::{Assembly, FrameAssembler, RawFrame},
    monitor::QueueMonitor,
    pool::DecoderPool,
    source::{LineSource, SourceEnd},
};

/// Counters describing a completed pipeline run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Why the line source stopped.
    pub source_end: Option<SourceEnd>,
    /// Terminated frames handed to the decoder pool.
    pub frames: u64,
    /// Messages the message handler accepted.
    pub messages_handled: u64,
    /// Errors delivered to the error handler.
    pub errors_reported: u64,
    /// Queue occupancy warnings emitted.
    pub queue_warnings: u64,
}

/// A configured channel pipeline.
///
/// # Examples
///
/// ```
/// use xymon_channels::{ChannelError, HandlerError, Message, Pipeline, PipelineConfig};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), xymon_channels::PipelineError> {
/// let input = &b"@@notify#1|1700000000.0|10.0.0.1|web01|http|ops\nsite down\n@@\n"[..];
/// let pipeline = Pipeline::new(
///     PipelineConfig::default(),
///     |message: Message| -> Result<(), HandlerError> {
///         assert_eq!(message.body, ["site down"]);
///         Ok(())
///     },
///     |error: ChannelError| eprintln!("unexpected error: {error}"),
/// )?;
///
/// let report = pipeline.run(input).await?;
/// assert_eq!(report.messages_handled, 1);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline<M, E> {
    config: PipelineConfig,
    message_handler: M,
    error_handler: E,
}

impl<M, E> Pipeline<M, E>
where
    M: MessageHandler,
    E: ErrorHandler,
{
    /// Create a pipeline delivering messages and errors to the given
    /// handlers.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Config`] if `config` fails validation.
    pub fn new(
        config: PipelineConfig,
        message_handler: M,
        error_handler: E,
    ) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            config,
            message_handler,
            error_handler,
        })
    }

    /// Configuration this pipeline runs with.
    #[must_use]
    pub fn config(&self) -> &PipelineConfig { &self.config }

    /// Process `input` until it ends.
    ///
    /// # Errors
    ///
    /// See [`Pipeline::run_with_shutdown`].
    pub async fn run<R>(self, input: R) -> Result<PipelineReport, PipelineError>
    where
        R: AsyncRead + Unpin,
    {
        self.run_with_shutdown(input, future::pending()).await
    }

    /// Process `input` until it ends or `shutdown` resolves.
    ///
    /// Either way every line already read is framed, decoded and dispatched
    /// before this returns.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Read`] if reading `input` failed, after
    /// everything read up to the failure has been dispatched, or
    /// [`PipelineError::Task`] if a pipeline task panicked.
    pub async fn run_with_shutdown<R, S>(
        self,
        input: R,
        shutdown: S,
    ) -> Result<PipelineReport, PipelineError>
    where
        R: AsyncRead + Unpin,
        S: Future<Output = ()>,
    {
        let Self {
            config,
            message_handler,
            error_handler,
        } = self;

        let (line_tx, line_rx) = mpsc::channel::<String>(config.lines.capacity);
        let (msg_tx, msg_rx) = mpsc::channel(config.messages.capacity);
        let (err_tx, err_rx) = mpsc::channel(config.errors.capacity);

        let monitor = QueueMonitor::from_config(&config)
            .watch(QueueName::Lines, config.lines, &line_tx)
            .watch(QueueName::Messages, config.messages, &msg_tx)
            .watch(QueueName::Errors, config.errors, &err_tx);
        let stop_monitor = CancellationToken::new();
        let stop_source = CancellationToken::new();

        let tracker = TaskTracker::new();
        let pool = DecoderPool::new(config.decode_concurrency, msg_tx, err_tx.clone());
        let frames = tracker.spawn(assemble(line_rx, pool));
        let handled = tracker.spawn(message_worker(msg_rx, message_handler, err_tx));
        let reported = tracker.spawn(error_worker(err_rx, error_handler));
        let warnings = tracker.spawn(monitor.run(stop_monitor.clone()));
        tracker.close();

        let forward = LineSource::new(input, &config).forward(line_tx, stop_source.clone());
        tokio::pin!(forward);
        let read = tokio::select! {
            read = &mut forward => read,
            () = shutdown => {
                info!("shutdown requested; draining pipeline");
                stop_source.cancel();
                forward.await
            }
        };

        let (frames, handled, reported) = (frames.await, handled.await, reported.await);
        stop_monitor.cancel();
        let warnings = warnings.await;
        tracker.wait().await;

        let mut report = PipelineReport {
            source_end: None,
            frames: frames?,
            messages_handled: handled?,
            errors_reported: reported?,
            queue_warnings: warnings?,
        };
        match read {
            Ok(end) => {
                report.source_end = Some(end);
                debug!(?report, "pipeline finished");
                Ok(report)
            }
            Err(err) => {
                warn!(error = %err, ?report, "pipeline drained after read failure");
                Err(PipelineError::Read(err))
            }
        }
    }
}

/// Group queued lines into frames and submit each one for decoding.
///
/// Returns the number of frames submitted once the line queue has closed and
/// every submitted frame has been published.
async fn assemble(mut lines: mpsc::Receiver<String>, pool: DecoderPool) -> u64 {
    let mut assembler = FrameAssembler::new();
    let mut frames = 0;
    while let Some(line) = lines.recv().await {
        match assembler.push(line) {
            Assembly::Pending => {}
            Assembly::Complete(frame) => {
                frames += 1;
                pool.submit(frame).await;
            }
            Assembly::Abandoned(frame) => abandon(&pool, frame, "new header").await,
            Assembly::Ignored => debug!("stray frame terminator ignored"),
        }
    }
    if let Some(frame) = assembler.finish() {
        abandon(&pool, frame, "end of input").await;
    }
    pool.drain().await;
    frames
}

async fn abandon(pool: &DecoderPool, frame: RawFrame, reason: &'static str) {
    warn!(lines = frame.len(), header = ?frame.header(), reason, "discarding unterminated frame");
    #[cfg(feature = "metrics")]
    crate::metrics::inc_frames_abandoned();
    pool.report(ChannelError::AbandonedFrame { frame }).await;
}
