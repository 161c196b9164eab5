//! Line source feeding the pipeline.
//!
//! [`LineSource`] reads lines from any [`AsyncRead`] with a [`LineCodec`]
//! and pushes them, unmodified and in arrival order, onto the bounded line
//! queue. A full queue suspends the push, which in turn stops reading from
//! the input: backpressure reaches the upstream writer through the pipe.

use futures::StreamExt;
use tokio::{io::AsyncRead, sync::mpsc};
use tokio_util::{codec::FramedRead, sync::CancellationToken};
use tracing::{debug, warn};

use crate::{
    codec::{LineCodec, ReadError},
    config::PipelineConfig,
};

/// Why a [`LineSource`] stopped forwarding lines.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SourceEnd {
    /// The input reached end of stream.
    Eof,
    /// Shutdown was requested.
    Shutdown,
    /// The line queue was closed by its consumer.
    Closed,
}

/// Stream of input lines.
pub struct LineSource<R> {
    lines: FramedRead<R, LineCodec>,
}

impl<R> LineSource<R>
where
    R: AsyncRead + Unpin,
{
    /// Wrap `reader`, sizing the read buffer from `config`.
    pub fn new(reader: R, config: &PipelineConfig) -> Self {
        Self {
            lines: FramedRead::with_capacity(
                reader,
                LineCodec::new(config.max_line_length),
                config.initial_line_capacity,
            ),
        }
    }

    /// Read the next line.
    ///
    /// Returns `None` at end of stream.
    pub async fn next_line(&mut self) -> Option<Result<String, ReadError>> {
        self.lines.next().await
    }

    /// Push every line onto `queue` until end of stream, shutdown, or a read
    /// failure.
    ///
    /// Shutdown only stops further reads; a line already read is always
    /// queued.
    ///
    /// # Errors
    ///
    /// Returns a [`ReadError`] when a line exceeds the configured maximum or
    /// the reader fails. Lines read before the failure have been queued.
    pub async fn forward(
        mut self,
        queue: mpsc::Sender<String>,
        shutdown: CancellationToken,
    ) -> Result<SourceEnd, ReadError> {
        let mut forwarded: u64 = 0;
        let end = loop {
            let next = tokio::select! {
                biased;

                () = shutdown.cancelled() => break SourceEnd::Shutdown,
                next = self.next_line() => next,
            };
            let line = match next {
                None => break SourceEnd::Eof,
                Some(Err(err)) => {
                    warn!(error = %err, forwarded, "line source failed");
                    return Err(err);
                }
                Some(Ok(line)) => line,
            };
            if queue.send(line).await.is_err() {
                break SourceEnd::Closed;
            }
            forwarded += 1;
        };
        debug!(?end, forwarded, "line source stopped");
        Ok(end)
    }
}
