//! Error types for the document and notification services
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == App Error Enum ==
/// Unified error type surfaced to HTTP callers.
#[derive(Error, Debug)]
pub enum AppError {
    /// Business-rule or request validation failure
    #[error("{0}")]
    Validation(String),

    /// Requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// Entity already exists
    #[error("{0}")]
    Conflict(String),

    /// The message queue refused admission
    #[error("Queue unavailable: {0}")]
    QueueUnavailable(#[from] BrokerError),

    /// Backing store failure
    #[error("Persistence error: {0}")]
    Persistence(#[from] StorageError),

    /// Internal server error
    #[error("Internal error: {0}")]
    Internal(String),
}

// == IntoResponse Implementation ==
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::QueueUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Persistence(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "success": false,
            "data": null,
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Delivery Error ==
/// Failure to hand a notification to the notification subsystem.
///
/// Never propagated to a document caller; it is recorded on the document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeliveryError {
    /// The ingress answered but refused the submission
    #[error("notification ingress rejected the request: {0}")]
    Rejected(String),

    /// The ingress could not be reached
    #[error("notification transport failed: {0}")]
    Transport(String),

    /// Admission did not complete in time
    #[error("notification delivery timed out after {0} ms")]
    Timeout(u64),
}

impl DeliveryError {
    /// Timeout error for a limit of `limit`, saturating at `u64::MAX` ms.
    pub fn timed_out(limit: std::time::Duration) -> Self {
        DeliveryError::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
    }
}

// == Storage Error ==
/// Failure reported by a repository.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("duplicate key: {0}")]
    Duplicate(String),
}

// == Broker Error ==
/// Failure to admit a message to the queue.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BrokerError {
    #[error("no queue bound to routing key '{0}'")]
    UnknownRoute(String),

    #[error("no such queue '{0}'")]
    UnknownQueue(String),

    #[error("queue '{0}' is full")]
    QueueFull(String),

    #[error("broker is shut down")]
    Closed,
}

// == Result Type Alias ==
/// Convenience Result type for the services.
pub type Result<T> = std::result::Result<T, AppError>;
