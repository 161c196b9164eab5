//! Bounded pool of concurrent frame decoders.
//!
//! Each submitted [`RawFrame`] is decoded on its own task and the outcome is
//! published to the message queue or the error queue. At most
//! `decode_concurrency` frames are in flight; a decode task holds its permit
//! until its result has been queued, so a full message queue stops new
//! submissions and the pressure reaches the line source.
//!
//! Decode tasks run concurrently, so messages reach the message queue in
//! completion order rather than input order.

use std::sync::Arc;

use tokio::sync::{Semaphore, mpsc};
use tokio_util::task::TaskTracker;
use tracing::debug;

use crate::{
    decode::{DecodeError, decode_frame},
    error::ChannelError,
    frame::RawFrame,
    message::Message,
};

/// Spawns one decode task per frame, bounded by a semaphore.
#[derive(Debug)]
pub struct DecoderPool {
    permits: Arc<Semaphore>,
    limit: usize,
    tracker: TaskTracker,
    messages: mpsc::Sender<Message>,
    errors: mpsc::Sender<ChannelError>,
}

impl DecoderPool {
    /// Create a pool decoding at most `limit` frames at once.
    ///
    /// A `limit` of zero is treated as one.
    #[must_use]
    pub fn new(
        limit: usize,
        messages: mpsc::Sender<Message>,
        errors: mpsc::Sender<ChannelError>,
    ) -> Self {
        let limit = limit.max(1);
        Self {
            permits: Arc::new(Semaphore::new(limit)),
            limit,
            tracker: TaskTracker::new(),
            messages,
            errors,
        }
    }

    /// Number of frames currently being decoded or waiting to queue their
    /// result.
    #[must_use]
    pub fn in_flight(&self) -> usize { self.limit - self.permits.available_permits() }

    /// Decode `frame` on a new task.
    ///
    /// Waits for a free decode slot first; the wait is the pool's
    /// backpressure on the caller.
    pub async fn submit(&self, frame: RawFrame) {
        // The semaphore is never closed, so acquisition only fails if that
        // changes; decoding proceeds unbounded rather than dropping the frame.
        let permit = Arc::clone(&self.permits).acquire_owned().await.ok();
        let messages = self.messages.clone();
        let errors = self.errors.clone();
        self.tracker.spawn(async move {
            let _permit = permit;
            publish(decode_frame(frame), &messages, &errors).await;
        });
    }

    /// Report an error that did not come from a decode task.
    pub async fn report(&self, error: ChannelError) {
        if self.errors.send(error).await.is_err() {
            debug!("error queue closed; dropping report");
        }
    }

    /// Wait for every submitted frame to be published, then release the
    /// pool's queue senders.
    pub async fn drain(self) {
        let Self {
            tracker,
            messages,
            errors,
            ..
        } = self;
        drop(messages);
        drop(errors);
        tracker.close();
        tracker.wait().await;
    }
}

async fn publish(
    result: Result<Message, DecodeError>,
    messages: &mpsc::Sender<Message>,
    errors: &mpsc::Sender<ChannelError>,
) {
    match result {
        Ok(message) => {
            #[cfg(feature = "metrics")]
            crate::metrics::inc_frames_decoded(message.kind);
            if messages.send(message).await.is_err() {
                debug!("message queue closed; dropping decoded message");
            }
        }
        Err(err) => {
            #[cfg(feature = "metrics")]
            crate::metrics::inc_decode_errors();
            debug!(error = %err, "frame rejected");
            if errors.send(ChannelError::Decode(err)).await.is_err() {
                debug!("error queue closed; dropping decode error");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};
    use tokio::time::{Duration, timeout};

    use super::*;
    use crate::protocol::MessageType;

    const NOTIFY: &str = "@@notify#1|1700000000.0|10.0.0.1|web01|http|ops";

    type Queues = (
        mpsc::Sender<Message>,
        mpsc::Receiver<Message>,
        mpsc::Sender<ChannelError>,
        mpsc::Receiver<ChannelError>,
    );

    #[fixture]
    fn queues() -> Queues {
        let (msg_tx, msg_rx) = mpsc::channel(4);
        let (err_tx, err_rx) = mpsc::channel(4);
        (msg_tx, msg_rx, err_tx, err_rx)
    }

    fn frame(header: &str) -> RawFrame { RawFrame::new(vec![header.to_owned(), "body".to_owned()]) }

    #[rstest]
    #[tokio::test]
    async fn decoded_frames_reach_the_message_queue(queues: Queues) {
        let (msg_tx, mut msg_rx, err_tx, mut err_rx) = queues;
        let pool = DecoderPool::new(2, msg_tx, err_tx);

        pool.submit(frame(NOTIFY)).await;
        pool.drain().await;

        let message = msg_rx.recv().await.expect("decoded message");
        assert_eq!(message.kind, MessageType::Notify);
        assert_eq!(message.body, ["body"]);
        assert!(msg_rx.recv().await.is_none());
        assert!(err_rx.recv().await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_frames_reach_the_error_queue(queues: Queues) {
        let (msg_tx, mut msg_rx, err_tx, mut err_rx) = queues;
        let pool = DecoderPool::new(2, msg_tx, err_tx);

        pool.submit(frame("@@bogus|1|2")).await;
        pool.drain().await;

        let err = err_rx.recv().await.expect("decode error");
        assert!(matches!(
            err,
            ChannelError::Decode(DecodeError::UnknownType { ref token, .. }) if token == "bogus"
        ));
        assert!(msg_rx.recv().await.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn full_message_queue_holds_decode_slots() {
        let (msg_tx, mut msg_rx) = mpsc::channel(1);
        let (err_tx, _err_rx) = mpsc::channel(1);
        let pool = DecoderPool::new(1, msg_tx, err_tx);

        // First result fills the queue; the second task holds the only slot
        // waiting for space.
        pool.submit(frame(NOTIFY)).await;
        pool.submit(frame(NOTIFY)).await;
        tokio::task::yield_now().await;
        assert_eq!(pool.in_flight(), 1);

        let third = timeout(Duration::from_millis(50), pool.submit(frame(NOTIFY))).await;
        assert!(third.is_err(), "submission must wait for a free slot");

        let mut received = 0;
        let drain = tokio::spawn(pool.drain());
        while msg_rx.recv().await.is_some() {
            received += 1;
        }
        drain.await.expect("join drain");
        assert_eq!(received, 2);
    }
}
