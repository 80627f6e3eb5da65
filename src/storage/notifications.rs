//! In-memory notification repository.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{NotificationRepository, StorageResult};
use crate::models::{Notification, NotificationDraft, NotificationFilter, Page, PageRequest};

/// Append-only notification log.
#[derive(Debug, Default)]
pub struct InMemoryNotificationRepository {
    notifications: RwLock<Vec<Notification>>,
}

impl InMemoryNotificationRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.notifications.read().await.len()
    }
}

#[async_trait]
impl NotificationRepository for InMemoryNotificationRepository {
    async fn insert(&self, draft: NotificationDraft) -> StorageResult<Notification> {
        let notification = draft.into_notification(Uuid::new_v4().to_string());
        self.notifications.write().await.push(notification.clone());
        Ok(notification)
    }

    async fn find_page(
        &self,
        filter: &NotificationFilter,
        request: PageRequest,
    ) -> StorageResult<Page<Notification>> {
        let notifications = self.notifications.read().await;
        let matching: Vec<Notification> = notifications
            .iter()
            .filter(|n| filter.matches(n))
            .cloned()
            .collect();
        Ok(Page::from_items(matching, request))
    }
}
