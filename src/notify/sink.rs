//! Notification sinks
//!
//! A sink hands a notification request to the notification subsystem and
//! reports only whether it was admitted.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;

use crate::error::{AppError, DeliveryError};
use crate::models::NotificationRequest;
use crate::services::NotificationIngress;

/// Transport from the document service to the notification ingress.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    async fn send(&self, request: &NotificationRequest) -> Result<(), DeliveryError>;
}

// == HTTP Sink ==
/// Posts requests to a remote notification ingress.
pub struct HttpNotificationSink {
    client: reqwest::Client,
    url: String,
    timeout: Duration,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl HttpNotificationSink {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DeliveryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            url: url.into(),
            timeout,
        })
    }
}

#[async_trait]
impl NotificationSink for HttpNotificationSink {
    async fn send(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DeliveryError::timed_out(self.timeout)
                } else {
                    DeliveryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let reason = response
            .json::<ErrorBody>()
            .await
            .ok()
            .and_then(|body| body.error)
            .unwrap_or_else(|| status.to_string());
        Err(DeliveryError::Rejected(format!("{}: {}", status.as_u16(), reason)))
    }
}

// == Local Sink ==
/// Submits straight to an ingress running in the same process.
pub struct LocalNotificationSink {
    ingress: Arc<NotificationIngress>,
}

impl LocalNotificationSink {
    pub fn new(ingress: Arc<NotificationIngress>) -> Self {
        Self { ingress }
    }
}

#[async_trait]
impl NotificationSink for LocalNotificationSink {
    async fn send(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        self.ingress
            .submit(request.clone())
            .map_err(|err| match err {
                AppError::Validation(msg) => DeliveryError::Rejected(msg),
                other => DeliveryError::Rejected(other.to_string()),
            })
    }
}

// == In-Memory Sink ==
/// Records every request; can be switched to fail. Used in tests.
#[derive(Default)]
pub struct InMemorySink {
    sent: Mutex<Vec<NotificationRequest>>,
    failure: Mutex<Option<DeliveryError>>,
}

impl InMemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every send fails with `error`.
    pub fn failing(error: DeliveryError) -> Self {
        let sink = Self::new();
        sink.fail_with(Some(error));
        sink
    }

    pub fn fail_with(&self, error: Option<DeliveryError>) {
        *self.failure.lock() = error;
    }

    pub fn sent(&self) -> Vec<NotificationRequest> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationSink for InMemorySink {
    async fn send(&self, request: &NotificationRequest) -> Result<(), DeliveryError> {
        if let Some(err) = self.failure.lock().clone() {
            return Err(err);
        }
        self.sent.lock().push(request.clone());
        Ok(())
    }
}
