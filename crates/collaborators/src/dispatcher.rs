//! Fire-and-forget notification dispatch.
//!
//! Lifecycle operations hand rendered notifications to the dispatcher after
//! their write succeeds. A single background task drains the queue into the
//! sink; delivery failures are logged and counted, never returned.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::notification::{Notification, NotificationSink};

enum Message {
    Deliver(Notification),
    Flush(oneshot::Sender<()>),
}

/// Handle to the notification worker. Cheap to clone.
#[derive(Clone)]
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<Message>,
}

impl NotificationDispatcher {
    /// Starts the worker on the current tokio runtime.
    ///
    /// The worker runs until every dispatcher handle is dropped.
    pub fn spawn(sink: Arc<dyn NotificationSink>) -> (Self, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(run_worker(sink, rx));
        (Self { tx }, handle)
    }

    /// Queues a notification. Never blocks and never fails the caller.
    pub fn notify(&self, notification: Notification) {
        let order_id = notification.order_id;
        let kind = notification.kind;
        if self.tx.send(Message::Deliver(notification)).is_err() {
            metrics::counter!("notifications_failed_total").increment(1);
            tracing::warn!(?order_id, %kind, "notification worker has stopped, dropping notification");
        }
    }

    /// Waits until everything queued before this call has been handled.
    pub async fn flush(&self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.tx.send(Message::Flush(done_tx)).is_ok() {
            let _ = done_rx.await;
        }
    }
}

async fn run_worker(sink: Arc<dyn NotificationSink>, mut rx: mpsc::UnboundedReceiver<Message>) {
    while let Some(message) = rx.recv().await {
        match message {
            Message::Deliver(notification) => {
                let order_id = notification.order_id;
                let kind = notification.kind;
                let target = notification.target_id;
                match sink.deliver(notification).await {
                    Ok(()) => {
                        metrics::counter!("notifications_dispatched_total").increment(1);
                        tracing::debug!(?order_id, %kind, %target, "notification delivered");
                    }
                    Err(e) => {
                        metrics::counter!("notifications_failed_total").increment(1);
                        tracing::warn!(?order_id, %kind, %target, error = %e, "notification delivery failed");
                    }
                }
            }
            Message::Flush(done) => {
                let _ = done.send(());
            }
        }
    }
    tracing::debug!("notification worker stopped");
}
