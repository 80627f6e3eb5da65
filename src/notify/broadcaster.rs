//! Notification Broadcaster
//!
//! Best-effort live delivery of persisted notifications to every attached
//! subscriber. Not a durable stream: subscribers see only what is published
//! after they attach, and one that falls more than `capacity` notifications
//! behind loses its oldest backlog instead of slowing the publisher.

use tokio::sync::broadcast::{
    self,
    error::{RecvError, TryRecvError},
};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, warn};

use crate::models::Notification;

#[derive(Debug, Clone)]
pub struct NotificationBroadcaster {
    tx: broadcast::Sender<Notification>,
}

impl NotificationBroadcaster {
    /// `capacity` is the backlog each subscriber may accumulate.
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Pushes a notification to all current subscribers without waiting.
    ///
    /// Returns the number of subscribers it was queued for.
    pub fn publish(&self, notification: Notification) -> usize {
        let id = notification.id.clone();
        match self.tx.send(notification) {
            Ok(receivers) => {
                debug!("Broadcast notification {} to {} subscriber(s)", id, receivers);
                receivers
            }
            Err(_) => {
                debug!("No subscribers for notification {}", id);
                0
            }
        }
    }

    /// Opens a subscription that starts at the next published notification.
    pub fn subscribe(&self) -> NotificationSubscription {
        NotificationSubscription {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

// == Subscription ==
/// One live subscriber. Dropping it detaches from the broadcaster.
#[derive(Debug)]
pub struct NotificationSubscription {
    rx: broadcast::Receiver<Notification>,
}

impl NotificationSubscription {
    /// Next notification; `None` once the broadcaster is gone.
    pub async fn recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.recv().await {
                Ok(notification) => return Some(notification),
                Err(RecvError::Lagged(skipped)) => {
                    warn!("Live subscriber lagged, dropped {} notification(s)", skipped);
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next notification if one is already buffered.
    pub fn try_recv(&mut self) -> Option<Notification> {
        loop {
            match self.rx.try_recv() {
                Ok(notification) => return Some(notification),
                Err(TryRecvError::Lagged(skipped)) => {
                    warn!("Live subscriber lagged, dropped {} notification(s)", skipped);
                }
                Err(TryRecvError::Empty) | Err(TryRecvError::Closed) => return None,
            }
        }
    }

    /// Turns the subscription into a stream, skipping over lag gaps.
    pub fn into_stream(self) -> impl Stream<Item = Notification> + Send + 'static {
        BroadcastStream::new(self.rx).filter_map(|item| match item {
            Ok(notification) => Some(notification),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                warn!("Live stream lagged, dropped {} notification(s)", skipped);
                None
            }
        })
    }
}
