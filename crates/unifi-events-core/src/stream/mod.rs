// ── Notification fan-out ──
//
// A single broadcast channel carries every notification; each
// subscription filters it down to its topic on the receiving side.

mod filter;

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use futures_core::Stream;
use serde_json::Value;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tracing::{trace, warn};

pub use filter::{Topic, TopicParseError};

use crate::event::classify;
use crate::notification::Notification;

/// Buffered notifications per subscriber before it starts lagging.
pub const NOTIFICATION_CHANNEL_CAPACITY: usize = 1024;

// ── Dispatcher ───────────────────────────────────────────────────────

/// Publishes notifications to every live subscription.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    tx: broadcast::Sender<Arc<Notification>>,
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new(NOTIFICATION_CHANNEL_CAPACITY)
    }
}

impl Dispatcher {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish to all subscribers. Returns how many received it; having
    /// none is not an error.
    pub fn publish(&self, notification: Notification) -> usize {
        trace!(channel = %notification.channel(), "publish");
        self.tx.send(Arc::new(notification)).unwrap_or(0)
    }

    /// Classify a raw record and publish it. Unclassifiable records are
    /// dropped; returns whether anything was published.
    pub fn publish_record(&self, record: Value) -> bool {
        match classify(record) {
            Some(event) => {
                self.publish(Notification::Event(event));
                true
            }
            None => false,
        }
    }

    pub fn subscribe(&self, topic: Topic) -> Subscription {
        Subscription {
            topic,
            rx: self.tx.subscribe(),
        }
    }
}

// ── Subscription ─────────────────────────────────────────────────────

/// A topic-filtered view of the notification channel.
pub struct Subscription {
    topic: Topic,
    rx: broadcast::Receiver<Arc<Notification>>,
}

impl Subscription {
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Wait for the next matching notification. Returns `None` once the
    /// client is gone.
    pub async fn recv(&mut self) -> Option<Arc<Notification>> {
        loop {
            match self.rx.recv().await {
                Ok(notification) if self.topic.matches(&notification) => {
                    return Some(notification);
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, topic = %self.topic, "subscriber lagged, notifications dropped");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next matching notification if one is already queued.
    pub fn try_recv(&mut self) -> Option<Arc<Notification>> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) if self.topic.matches(&notification) => {
                    return Some(notification);
                }
                Ok(_) | Err(broadcast::error::TryRecvError::Lagged(_)) => {}
                Err(_) => return None,
            }
        }
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> NotificationStream {
        NotificationStream {
            topic: self.topic,
            inner: BroadcastStream::new(self.rx),
        }
    }
}

/// `Stream` adapter over a [`Subscription`].
pub struct NotificationStream {
    topic: Topic,
    inner: BroadcastStream<Arc<Notification>>,
}

impl Stream for NotificationStream {
    type Item = Arc<Notification>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(notification))) => {
                    if self.topic.matches(&notification) {
                        return Poll::Ready(Some(notification));
                    }
                }
                Poll::Ready(Some(Err(BroadcastStreamRecvError::Lagged(skipped)))) => {
                    warn!(skipped, topic = %self.topic, "subscriber lagged, notifications dropped");
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use futures_util::StreamExt;
    use serde_json::json;

    use super::*;
    use crate::event::EventGroup;

    #[tokio::test]
    async fn subscription_filters_by_topic() {
        let dispatcher = Dispatcher::default();
        let mut logins = dispatcher.subscribe("lu.login".parse().unwrap());
        let mut everything = dispatcher.subscribe(Topic::All);

        dispatcher.publish(Notification::Connected);
        assert!(dispatcher.publish_record(json!({ "key": "EVT_WU_Connected" })));
        assert!(dispatcher.publish_record(json!({ "key": "EVT_LU_Login", "user": "x" })));

        let login = logins.recv().await.unwrap();
        let event = login.as_event().unwrap();
        assert_eq!(event.group, EventGroup::Lu);
        assert_eq!(event.payload["user"], "x");
        assert!(logins.try_recv().is_none());

        let channels: Vec<_> = std::iter::from_fn(|| everything.try_recv())
            .map(|n| n.channel().into_owned())
            .collect();
        assert_eq!(channels, ["unifi.connect", "wu.connected", "lu.login"]);
    }

    #[tokio::test]
    async fn unclassifiable_records_are_not_published() {
        let dispatcher = Dispatcher::default();
        let mut all = dispatcher.subscribe(Topic::All);

        assert!(!dispatcher.publish_record(json!({ "key": "OTHER" })));
        assert!(!dispatcher.publish_record(json!({ "no_key": true })));
        assert!(all.try_recv().is_none());
    }

    #[test]
    fn publishing_without_subscribers_is_fine() {
        let dispatcher = Dispatcher::default();
        assert_eq!(dispatcher.publish(Notification::Disconnected), 0);
    }

    #[tokio::test]
    async fn stream_yields_matching_notifications() {
        let dispatcher = Dispatcher::default();
        let stream = dispatcher.subscribe(Topic::Lifecycle).into_stream();

        dispatcher.publish_record(json!({ "key": "EVT_AP_Connected" }));
        dispatcher.publish(Notification::Reconnecting { attempt: 3 });
        drop(dispatcher);

        let got: Vec<_> = stream.collect().await;
        assert_eq!(got.len(), 1);
        assert!(matches!(*got[0], Notification::Reconnecting { attempt: 3 }));
    }
}
