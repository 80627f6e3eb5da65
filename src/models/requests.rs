//! Request DTOs for the HTTP API
//!
//! Defines the structure of incoming HTTP request bodies. Structural checks
//! live here; business rules are enforced by the services.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{DocumentFilter, DocumentType, EventType, NotificationFilter};

fn default_page_size() -> i64 {
    10
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Request body for creating or updating a document.
///
/// On update only the present fields overlay the stored document.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRequest {
    pub name: Option<String>,
    pub document_type: Option<DocumentType>,
    pub user_name: Option<String>,
    pub file_url: Option<String>,
    pub expiry_date: Option<NaiveDate>,
}

/// Request body for POST /v1/api/documents/filter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilterRequest {
    pub document_type: Option<DocumentType>,
    pub user: Option<String>,
    pub verified: Option<bool>,
    pub is_notification_failed: Option<bool>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

impl DocumentFilterRequest {
    pub fn filter(&self) -> DocumentFilter {
        DocumentFilter {
            document_type: self.document_type,
            user_name: self.user.clone(),
            verified: self.verified,
            notification_failed: self.is_notification_failed,
        }
    }
}

/// Request body for POST /v1/api/users
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRequest {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
}

impl UserRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if is_blank(&self.user_name) {
            return Some("Username is required".to_string());
        }
        if is_blank(&self.first_name) {
            return Some("First name is required".to_string());
        }
        if is_blank(&self.last_name) {
            return Some("Last name is required".to_string());
        }
        None
    }
}

/// Request body for POST /v1/api/users/filter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFilterRequest {
    pub user_name: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

/// Notification submission accepted by the ingress and carried on the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub receiver: String,
    pub document_name: String,
    pub document_id: String,
    pub event_type: EventType,
    pub message: String,
    /// When the document service sent it; informational only
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
}

impl NotificationRequest {
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if is_blank(&self.receiver) {
            return Some("Receiver is required".to_string());
        }
        if is_blank(&self.document_name) {
            return Some("Document name is required".to_string());
        }
        if is_blank(&self.document_id) {
            return Some("Document ID is required".to_string());
        }
        if is_blank(&self.message) {
            return Some("Message is required".to_string());
        }
        None
    }
}

/// Request body for POST /v1/api/notifications/filter
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationFilterRequest {
    pub event_type: Option<EventType>,
    pub receiver: Option<String>,
    pub document_name: Option<String>,
    #[serde(default)]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub size: i64,
}

impl NotificationFilterRequest {
    pub fn filter(&self) -> NotificationFilter {
        NotificationFilter {
            event_type: self.event_type,
            receiver: self.receiver.clone(),
            document_name: self.document_name.clone(),
        }
    }
}
