//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the server.
//!
//! # Tasks
//! - Notification ingestion: drains the notification queue, persists each
//!   message and pushes it to live subscribers

mod ingestor;

pub use ingestor::{spawn_ingestor_task, IngestOutcome, NotificationIngestor};
