//! Notification Ingestion Task
//!
//! Consumes the notification queue. Every message is decoded, stamped,
//! persisted and then broadcast. A message that cannot be decoded or
//! persisted is logged and dropped; there is no retry or dead-letter queue.

use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::models::{Notification, NotificationDraft, NotificationRequest};
use crate::notify::NotificationBroadcaster;
use crate::queue::QueueConsumer;
use crate::storage::NotificationRepository;

/// What happened to one queued message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestOutcome {
    Persisted(Notification),
    Malformed,
    PersistFailed,
}

pub struct NotificationIngestor {
    notifications: Arc<dyn NotificationRepository>,
    broadcaster: NotificationBroadcaster,
}

impl NotificationIngestor {
    pub fn new(
        notifications: Arc<dyn NotificationRepository>,
        broadcaster: NotificationBroadcaster,
    ) -> Self {
        Self {
            notifications,
            broadcaster,
        }
    }

    /// Handles one queued payload.
    ///
    /// The notification is broadcast only after it has been persisted, so
    /// live subscribers never see a record that queries cannot return.
    pub async fn handle(&self, payload: &[u8]) -> IngestOutcome {
        let request: NotificationRequest = match serde_json::from_slice(payload) {
            Ok(request) => request,
            Err(err) => {
                warn!("Dropping malformed notification message: {}", err);
                return IngestOutcome::Malformed;
            }
        };

        let now = Utc::now();
        if let Some(sent_at) = request.sent_at {
            debug!(
                "Notification for document {} spent {} ms in the queue",
                request.document_id,
                (now - sent_at).num_milliseconds()
            );
        }

        let draft = NotificationDraft {
            timestamp: now,
            receiver: request.receiver,
            document_id: request.document_id,
            document_name: request.document_name,
            event_type: request.event_type,
            message: request.message,
        };

        match self.notifications.insert(draft).await {
            Ok(notification) => {
                info!(
                    "Stored {} notification {} for {}",
                    notification.event_type, notification.id, notification.receiver
                );
                self.broadcaster.publish(notification.clone());
                IngestOutcome::Persisted(notification)
            }
            Err(err) => {
                error!("Failed to persist notification, message dropped: {}", err);
                IngestOutcome::PersistFailed
            }
        }
    }
}

/// Spawns the consumer loop for one queue.
///
/// The loop ends once the broker is shut down and the queue is drained.
///
/// # Arguments
/// * `consumer` - receiving end of the notification queue
/// * `ingestor` - shared handler applied to every message
///
/// # Returns
/// A JoinHandle for the spawned task, awaited or aborted during shutdown.
pub fn spawn_ingestor_task(
    consumer: QueueConsumer,
    ingestor: Arc<NotificationIngestor>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Notification ingestor listening on queue {}", consumer.queue());

        while let Some(payload) = consumer.recv().await {
            ingestor.handle(&payload).await;
        }

        info!("Notification queue {} closed, ingestor stopped", consumer.queue());
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::models::{EventType, NotificationFilter, Page, PageRequest};
    use crate::queue::{InMemoryBroker, MessageQueueBroker, QUEUE_NAME, ROUTING_KEY};
    use crate::storage::{InMemoryNotificationRepository, StorageResult};
    use async_trait::async_trait;
    use std::time::Duration;

    struct FailingRepository;

    #[async_trait]
    impl NotificationRepository for FailingRepository {
        async fn insert(&self, _draft: NotificationDraft) -> StorageResult<Notification> {
            Err(StorageError::Unavailable("disk full".into()))
        }

        async fn find_page(
            &self,
            _filter: &NotificationFilter,
            request: PageRequest,
        ) -> StorageResult<Page<Notification>> {
            Ok(Page::from_items(Vec::new(), request))
        }
    }

    fn payload(receiver: &str) -> Vec<u8> {
        serde_json::to_vec(&NotificationRequest {
            receiver: receiver.to_string(),
            document_name: format!("{receiver}_lease"),
            document_id: "d1".to_string(),
            event_type: EventType::Update,
            message: format!("{receiver} has updated the document named {receiver}_lease."),
            sent_at: Some(Utc::now()),
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_handle_persists_then_broadcasts() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let broadcaster = NotificationBroadcaster::new(8);
        let mut subscription = broadcaster.subscribe();
        let ingestor = NotificationIngestor::new(repo.clone(), broadcaster);

        let outcome = ingestor.handle(&payload("bob")).await;

        let IngestOutcome::Persisted(stored) = outcome else {
            panic!("expected the notification to be persisted");
        };
        assert!(!stored.id.is_empty());
        assert_eq!(repo.len().await, 1);
        assert_eq!(subscription.try_recv(), Some(stored));
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_nothing_from_before() {
        let broadcaster = NotificationBroadcaster::new(8);
        let ingestor = NotificationIngestor::new(
            Arc::new(InMemoryNotificationRepository::new()),
            broadcaster.clone(),
        );

        ingestor.handle(&payload("bob")).await;
        let mut late = broadcaster.subscribe();
        assert!(late.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_malformed_payload_dropped() {
        let repo = Arc::new(InMemoryNotificationRepository::new());
        let ingestor = NotificationIngestor::new(repo.clone(), NotificationBroadcaster::new(8));

        assert_eq!(ingestor.handle(b"not json").await, IngestOutcome::Malformed);
        assert_eq!(repo.len().await, 0);
    }

    #[tokio::test]
    async fn test_persist_failure_is_not_broadcast() {
        let broadcaster = NotificationBroadcaster::new(8);
        let mut subscription = broadcaster.subscribe();
        let ingestor = NotificationIngestor::new(Arc::new(FailingRepository), broadcaster);

        assert_eq!(ingestor.handle(&payload("bob")).await, IngestOutcome::PersistFailed);
        assert!(subscription.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_task_drains_queue_and_stops_on_shutdown() {
        let broker = InMemoryBroker::new(16);
        broker.bind(ROUTING_KEY, QUEUE_NAME);
        let consumer = broker.subscribe(QUEUE_NAME).unwrap();

        let repo = Arc::new(InMemoryNotificationRepository::new());
        let ingestor = Arc::new(NotificationIngestor::new(
            repo.clone(),
            NotificationBroadcaster::new(8),
        ));
        let handle = spawn_ingestor_task(consumer, ingestor);

        for receiver in ["alice", "bob", "carol"] {
            broker.publish(ROUTING_KEY, payload(receiver)).unwrap();
        }
        broker.shutdown();

        tokio::time::timeout(Duration::from_secs(2), handle)
            .await
            .expect("ingestor should stop after shutdown")
            .unwrap();
        assert_eq!(repo.len().await, 3);
    }
}
