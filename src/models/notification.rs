//! Notification record, event types and the query filter.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// == Event Type ==
/// Kind of document mutation a notification reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum EventType {
    Create,
    Update,
    Delete,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::Create => "CREATE",
            EventType::Update => "UPDATE",
            EventType::Delete => "DELETE",
        }
    }

    /// Message template with `{{userName}}` and `{{documentName}}` placeholders.
    pub fn message_template(&self) -> &'static str {
        match self {
            EventType::Create => "{{userName}} has added a new document named {{documentName}}.",
            EventType::Update => "{{userName}} has updated the document named {{documentName}}.",
            EventType::Delete => "{{userName}} has deleted the document named {{documentName}}.",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Notification ==
/// A persisted notification. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Assigned by the notification repository
    pub id: String,
    /// Persistence time, not enqueue time
    pub timestamp: DateTime<Utc>,
    pub receiver: String,
    pub document_id: String,
    pub document_name: String,
    pub event_type: EventType,
    /// Rendered at send time
    pub message: String,
}

// == Notification Draft ==
/// A notification ready to be persisted, still without an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDraft {
    pub timestamp: DateTime<Utc>,
    pub receiver: String,
    pub document_id: String,
    pub document_name: String,
    pub event_type: EventType,
    pub message: String,
}

impl NotificationDraft {
    pub fn into_notification(self, id: String) -> Notification {
        Notification {
            id,
            timestamp: self.timestamp,
            receiver: self.receiver,
            document_id: self.document_id,
            document_name: self.document_name,
            event_type: self.event_type,
            message: self.message,
        }
    }
}

// == Notification Filter ==
/// Conjunctive filter over persisted notifications; absent fields pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotificationFilter {
    pub event_type: Option<EventType>,
    pub receiver: Option<String>,
    pub document_name: Option<String>,
}

impl NotificationFilter {
    pub fn matches(&self, notification: &Notification) -> bool {
        self.event_type.map_or(true, |t| t == notification.event_type)
            && self
                .receiver
                .as_deref()
                .map_or(true, |r| r == notification.receiver)
            && self
                .document_name
                .as_deref()
                .map_or(true, |n| n == notification.document_name)
    }
}
