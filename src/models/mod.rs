//! Domain records and request/response DTOs
//!
//! Documents, users and notifications are the persisted records; the
//! request/response modules define the HTTP bodies around them.

pub mod document;
pub mod notification;
pub mod requests;
pub mod responses;
pub mod user;

// Re-export commonly used types
pub use document::{Document, DocumentFilter, DocumentType};
pub use notification::{EventType, Notification, NotificationDraft, NotificationFilter};
pub use requests::{
    DocumentFilterRequest, DocumentRequest, NotificationFilterRequest, NotificationRequest,
    UserFilterRequest, UserRequest,
};
pub use responses::{ApiResponse, HealthResponse, Page, PageRequest};
pub use user::User;
