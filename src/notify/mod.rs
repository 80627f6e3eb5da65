//! Notification Delivery Module
//!
//! Everything between a document mutation and a live subscriber:
//! - `gateway`: best-effort submission from the document path
//! - `sink`: transports the gateway submits through
//! - `broadcaster`: in-process fan-out of persisted notifications
//! - `template`: message rendering

mod broadcaster;
mod gateway;
mod sink;
mod template;

pub use broadcaster::{NotificationBroadcaster, NotificationSubscription};
pub use gateway::NotificationGateway;
pub use sink::{HttpNotificationSink, InMemorySink, LocalNotificationSink, NotificationSink};
pub use template::render_message;
