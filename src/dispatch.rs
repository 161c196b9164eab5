//! Handler traits and the two dispatch loops.
//!
//! [`message_worker`] drains the message queue and [`error_worker`] drains
//! the error queue. Each invokes its handler once per item, in the order the
//! items were queued. A message handler failure, including a panic, is turned
//! into a [`ChannelError::Handler`] and queued for the error handler; the
//! message loop carries on with the next message.

use std::{
    any::Any,
    panic::{AssertUnwindSafe, catch_unwind},
};

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::{
    error::{ChannelError, HandlerError},
    message::Message,
};

/// Consumer of decoded messages.
///
/// Implemented for every `FnMut(Message) -> Result<(), HandlerError>`
/// closure.
pub trait MessageHandler: Send + 'static {
    /// Handle one decoded message.
    ///
    /// # Errors
    ///
    /// Any error is reported to the [`ErrorHandler`]; it never stops
    /// dispatch.
    fn handle(&mut self, message: Message) -> Result<(), HandlerError>;
}

impl<F> MessageHandler for F
where
    F: FnMut(Message) -> Result<(), HandlerError> + Send + 'static,
{
    fn handle(&mut self, message: Message) -> Result<(), HandlerError> { self(message) }
}

/// Consumer of error observations.
///
/// Implemented for every `FnMut(ChannelError)` closure.
pub trait ErrorHandler: Send + 'static {
    /// Observe one error.
    fn handle(&mut self, error: ChannelError);
}

impl<F> ErrorHandler for F
where
    F: FnMut(ChannelError) + Send + 'static,
{
    fn handle(&mut self, error: ChannelError) { self(error) }
}

/// A message handler panicked.
#[derive(Debug, Error)]
#[error("message handler panicked: {message}")]
pub struct HandlerPanic {
    /// Panic payload rendered as text.
    pub message: String,
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_owned()
    } else {
        format!("{payload:?}")
    }
}

/// Deliver every queued message to `handler` until the queue closes.
///
/// Handler failures are sent to `errors`. Returns the number of messages
/// handled successfully.
pub async fn message_worker<H: MessageHandler>(
    mut queue: mpsc::Receiver<Message>,
    mut handler: H,
    errors: mpsc::Sender<ChannelError>,
) -> u64 {
    let mut handled = 0;
    while let Some(message) = queue.recv().await {
        let kind = message.kind;
        let outcome = catch_unwind(AssertUnwindSafe(|| handler.handle(message)))
            .unwrap_or_else(|payload| {
                Err(Box::new(HandlerPanic {
                    message: panic_message(payload.as_ref()),
                }) as HandlerError)
            });
        match outcome {
            Ok(()) => handled += 1,
            Err(source) => {
                #[cfg(feature = "metrics")]
                crate::metrics::inc_handler_errors(kind);
                warn!(%kind, error = %source, "message handler failed");
                if errors
                    .send(ChannelError::Handler { kind, source })
                    .await
                    .is_err()
                {
                    debug!(%kind, "error queue closed; dropping handler failure");
                }
            }
        }
    }
    debug!(handled, "message queue closed");
    handled
}

/// Deliver every queued error to `handler` until the queue closes.
///
/// Returns the number of errors delivered.
pub async fn error_worker<H: ErrorHandler>(
    mut queue: mpsc::Receiver<ChannelError>,
    mut handler: H,
) -> u64 {
    let mut delivered = 0;
    while let Some(error) = queue.recv().await {
        handler.handle(error);
        delivered += 1;
    }
    debug!(delivered, "error queue closed");
    delivered
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use rstest::rstest;
    use tracing_test::traced_test;

    use super::*;
    use crate::decode::decode_header;

    fn notify(test: &str) -> Message {
        decode_header(&format!("@@notify#1|1700000000.0|10.0.0.1|web01|{test}|ops"))
            .expect("valid notify header")
    }

    #[rstest]
    #[tokio::test]
    async fn messages_are_handled_in_queue_order() {
        let (tx, rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = mpsc::channel(8);
        for test in ["a", "b", "c"] {
            tx.send(notify(test)).await.expect("queue open");
        }
        drop(tx);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let handled = message_worker(
            rx,
            move |message: Message| -> Result<(), HandlerError> {
                sink.lock()
                    .expect("lock")
                    .push(message.test().map(str::to_owned));
                Ok(())
            },
            err_tx,
        )
        .await;

        assert_eq!(handled, 3);
        let seen = seen.lock().expect("lock");
        assert_eq!(
            *seen,
            [Some("a".to_owned()), Some("b".to_owned()), Some("c".to_owned())]
        );
        assert!(err_rx.recv().await.is_none());
    }

    #[rstest]
    #[traced_test]
    #[tokio::test]
    async fn handler_failure_is_forwarded_and_dispatch_continues() {
        let (tx, rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = mpsc::channel(8);
        for test in ["ok1", "fail", "ok2"] {
            tx.send(notify(test)).await.expect("queue open");
        }
        drop(tx);

        let handled = message_worker(
            rx,
            |message: Message| -> Result<(), HandlerError> {
                if message.test() == Some("fail") {
                    Err(Box::new(io::Error::other("sink unavailable")))
                } else {
                    Ok(())
                }
            },
            err_tx,
        )
        .await;

        assert_eq!(handled, 2);
        let err = err_rx.recv().await.expect("forwarded failure");
        assert!(matches!(
            &err,
            ChannelError::Handler { kind, source }
                if kind.as_str() == "notify" && source.to_string() == "sink unavailable"
        ));
        assert!(err_rx.recv().await.is_none());
        assert!(logs_contain("message handler failed"));
    }

    #[rstest]
    #[tokio::test]
    async fn handler_panic_is_reported_as_failure() {
        let (tx, rx) = mpsc::channel(8);
        let (err_tx, mut err_rx) = mpsc::channel(8);
        tx.send(notify("boom")).await.expect("queue open");
        tx.send(notify("after")).await.expect("queue open");
        drop(tx);

        let handled = message_worker(
            rx,
            |message: Message| -> Result<(), HandlerError> {
                assert_ne!(message.test(), Some("boom"), "handler exploded");
                Ok(())
            },
            err_tx,
        )
        .await;

        assert_eq!(handled, 1);
        let err = err_rx.recv().await.expect("panic reported");
        assert!(err.to_string().contains("handler exploded"), "{err}");
    }

    #[rstest]
    #[tokio::test]
    async fn errors_are_delivered_in_queue_order() {
        let (tx, rx) = mpsc::channel(8);
        for token in ["x", "y"] {
            let err = crate::decode::DecodeError::UnknownType {
                token: token.to_owned(),
                header: format!("@@{token}"),
            };
            tx.send(ChannelError::Decode(err)).await.expect("queue open");
        }
        drop(tx);
        let headers = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&headers);

        let delivered = error_worker(rx, move |error: ChannelError| {
            sink.lock()
                .expect("lock")
                .push(error.header().map(str::to_owned));
        })
        .await;

        assert_eq!(delivered, 2);
        assert_eq!(
            *headers.lock().expect("lock"),
            [Some("@@x".to_owned()), Some("@@y".to_owned())]
        );
    }
}
