//! Message queue broker contract and its in-process implementation.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, info};

use crate::error::BrokerError;

/// Admission-only queue contract.
///
/// `publish` reports whether the message was admitted, never whether it was
/// consumed. Each admitted message goes to exactly one consumer.
pub trait MessageQueueBroker: Send + Sync {
    /// Routes a message to the queue bound to `routing_key`.
    fn publish(&self, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError>;

    /// Attaches a consumer to a queue. Consumers of one queue compete.
    fn subscribe(&self, queue: &str) -> Result<QueueConsumer, BrokerError>;
}

// == Queue Consumer ==
/// Receiving end of a queue. Clones share the same queue.
#[derive(Debug, Clone)]
pub struct QueueConsumer {
    queue: String,
    rx: Arc<Mutex<mpsc::Receiver<Vec<u8>>>>,
}

impl QueueConsumer {
    /// Waits for the next message; `None` once the broker is shut down and
    /// the queue is drained.
    pub async fn recv(&self) -> Option<Vec<u8>> {
        self.rx.lock().await.recv().await
    }

    pub fn queue(&self) -> &str {
        &self.queue
    }
}

// == In-Memory Broker ==
struct BoundQueue {
    tx: mpsc::Sender<Vec<u8>>,
    consumer: QueueConsumer,
}

/// Bounded in-process queues behind direct-exchange style bindings.
///
/// Messages do not survive a restart.
pub struct InMemoryBroker {
    capacity: usize,
    queues: RwLock<HashMap<String, BoundQueue>>,
    /// routing key -> queue name
    bindings: RwLock<HashMap<String, String>>,
}

impl InMemoryBroker {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            queues: RwLock::new(HashMap::new()),
            bindings: RwLock::new(HashMap::new()),
        }
    }

    /// Declares a queue and binds a routing key to it.
    pub fn bind(&self, routing_key: &str, queue: &str) {
        let mut queues = self.queues.write();
        if !queues.contains_key(queue) {
            let (tx, rx) = mpsc::channel(self.capacity);
            let consumer = QueueConsumer {
                queue: queue.to_string(),
                rx: Arc::new(Mutex::new(rx)),
            };
            queues.insert(queue.to_string(), BoundQueue { tx, consumer });
            info!("Declared queue '{}' with capacity {}", queue, self.capacity);
        }
        self.bindings
            .write()
            .insert(routing_key.to_string(), queue.to_string());
        info!("Bound routing key '{}' to queue '{}'", routing_key, queue);
    }

    /// Stops admitting messages. Consumers drain what is queued, then see
    /// the end of the queue. Bindings stay, so later publishes fail with
    /// `BrokerError::Closed`.
    pub fn shutdown(&self) {
        let count = {
            let mut queues = self.queues.write();
            let count = queues.len();
            queues.clear();
            count
        };
        info!("Broker shut down, closed {} queue(s)", count);
    }
}

impl MessageQueueBroker for InMemoryBroker {
    fn publish(&self, routing_key: &str, payload: Vec<u8>) -> Result<(), BrokerError> {
        let queue = self
            .bindings
            .read()
            .get(routing_key)
            .cloned()
            .ok_or_else(|| BrokerError::UnknownRoute(routing_key.to_string()))?;

        let queues = self.queues.read();
        let bound = queues.get(&queue).ok_or(BrokerError::Closed)?;
        bound.tx.try_send(payload).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => BrokerError::QueueFull(queue.clone()),
            mpsc::error::TrySendError::Closed(_) => BrokerError::Closed,
        })?;

        debug!("Admitted message to queue '{}'", queue);
        Ok(())
    }

    fn subscribe(&self, queue: &str) -> Result<QueueConsumer, BrokerError> {
        self.queues
            .read()
            .get(queue)
            .map(|bound| bound.consumer.clone())
            .ok_or_else(|| BrokerError::UnknownQueue(queue.to_string()))
    }
}
