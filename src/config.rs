//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// Remote notification ingress URL; `None` delivers to the in-process ingress
    pub notification_service_url: Option<String>,
    /// Upper bound on a single notification delivery attempt, in milliseconds
    pub notify_timeout_ms: u64,
    /// Capacity of the notification queue
    pub queue_capacity: usize,
    /// Per-subscriber backlog of the live notification stream
    pub broadcast_capacity: usize,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `NOTIFICATION_SERVICE_URL` - remote ingress URL (default: unset)
    /// - `NOTIFY_TIMEOUT_MS` - delivery timeout (default: 5000)
    /// - `QUEUE_CAPACITY` - queued notifications (default: 1024)
    /// - `BROADCAST_CAPACITY` - live stream backlog per subscriber (default: 256)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            notification_service_url: env::var("NOTIFICATION_SERVICE_URL")
                .ok()
                .filter(|url| !url.trim().is_empty()),
            notify_timeout_ms: parse_var("NOTIFY_TIMEOUT_MS").unwrap_or(defaults.notify_timeout_ms),
            queue_capacity: parse_var("QUEUE_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.queue_capacity),
            broadcast_capacity: parse_var("BROADCAST_CAPACITY")
                .filter(|&n: &usize| n > 0)
                .unwrap_or(defaults.broadcast_capacity),
        }
    }

    /// Delivery timeout as a Duration.
    pub fn notify_timeout(&self) -> Duration {
        Duration::from_millis(self.notify_timeout_ms)
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            notification_service_url: None,
            notify_timeout_ms: 5000,
            queue_capacity: 1024,
            broadcast_capacity: 256,
        }
    }
}
