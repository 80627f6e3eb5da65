//! Notification Gateway
//!
//! Fire-and-forget submission used by document mutations. It waits only for
//! admission by the notification ingress and never fails the mutation
//! itself: callers record the returned error on the document.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, warn};

use crate::error::DeliveryError;
use crate::models::{Document, EventType, NotificationRequest};
use crate::notify::{render_message, NotificationSink};

pub struct NotificationGateway {
    sink: Arc<dyn NotificationSink>,
    timeout: Duration,
}

impl NotificationGateway {
    pub fn new(sink: Arc<dyn NotificationSink>, timeout: Duration) -> Self {
        Self { sink, timeout }
    }

    /// Builds the notification for a document event and submits it.
    ///
    /// A submission that does not complete within the timeout counts as a
    /// `DeliveryError::Timeout`.
    pub async fn notify(&self, event_type: EventType, document: &Document) -> Result<(), DeliveryError> {
        let request = NotificationRequest {
            receiver: document.user_name.clone(),
            document_name: document.name.clone(),
            document_id: document.id.clone(),
            event_type,
            message: render_message(
                event_type.message_template(),
                &document.user_name,
                &document.name,
            ),
            sent_at: Some(Utc::now()),
        };

        let result = match tokio::time::timeout(self.timeout, self.sink.send(&request)).await {
            Ok(result) => result,
            Err(_) => Err(DeliveryError::timed_out(self.timeout)),
        };

        match &result {
            Ok(()) => info!(
                "Notification sent for action: {} on document named: {}",
                event_type, document.name
            ),
            Err(err) => warn!(
                "Notification failed for action: {} on document named: {}: {}",
                event_type, document.name, err
            ),
        }
        result
    }
}
