//! Notification ingress and query services.

use std::sync::Arc;

use tracing::{error, info};

use crate::error::{AppError, Result};
use crate::models::{Notification, NotificationFilter, NotificationRequest, Page, PageRequest};
use crate::queue::{MessageQueueBroker, ROUTING_KEY};
use crate::storage::NotificationRepository;

// == Notification Ingress ==
/// Validates submissions and admits them to the queue. Returns as soon as
/// the broker has accepted the message; persistence happens later.
pub struct NotificationIngress {
    broker: Arc<dyn MessageQueueBroker>,
}

impl NotificationIngress {
    pub fn new(broker: Arc<dyn MessageQueueBroker>) -> Self {
        Self { broker }
    }

    pub fn submit(&self, request: NotificationRequest) -> Result<()> {
        if let Some(message) = request.validate() {
            return Err(AppError::Validation(message));
        }

        let payload =
            serde_json::to_vec(&request).map_err(|e| AppError::Internal(e.to_string()))?;
        if let Err(err) = self.broker.publish(ROUTING_KEY, payload) {
            error!(
                "Failed to enqueue {} notification for document {}: {}",
                request.event_type, request.document_id, err
            );
            return Err(err.into());
        }

        info!(
            "Queued {} notification for {} on document {}",
            request.event_type, request.receiver, request.document_id
        );
        Ok(())
    }
}

// == Notification Query Service ==
pub struct NotificationQueryService {
    notifications: Arc<dyn NotificationRepository>,
}

impl NotificationQueryService {
    pub fn new(notifications: Arc<dyn NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Conjunctive filter over stored notifications, paginated.
    pub async fn query(
        &self,
        filter: &NotificationFilter,
        page: i64,
        size: i64,
    ) -> Result<Page<Notification>> {
        let request = PageRequest::new(page, size)?;
        info!(
            "Fetching notifications with filters - type: {:?}, receiver: {:?}, documentName: {:?}",
            filter.event_type, filter.receiver, filter.document_name
        );
        Ok(self.notifications.find_page(filter, request).await?)
    }
}
