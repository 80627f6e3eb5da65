//! Queue Module
//!
//! The point-to-point queue that decouples notification admission from
//! notification persistence.
//!
//! # Topology
//! - Exchange `notifications.exchange`
//! - Routing key `notifications.routingkey`
//! - Queue `notifications.queue` (non-durable)

mod broker;

pub use broker::{InMemoryBroker, MessageQueueBroker, QueueConsumer};

pub const EXCHANGE_NAME: &str = "notifications.exchange";
pub const ROUTING_KEY: &str = "notifications.routingkey";
pub const QUEUE_NAME: &str = "notifications.queue";
