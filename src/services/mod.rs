//! Services Module
//!
//! Business operations behind the HTTP handlers.
//!
//! # Services
//! - `DocumentService`: validated document mutations and cached reads
//! - `UserService`: user lifecycle
//! - `NotificationIngress`: admits notification submissions to the queue
//! - `NotificationQueryService`: paginated reads over stored notifications

mod documents;
mod notifications;
mod users;

pub use documents::{DocumentService, MIN_EXPIRY_DAYS};
pub use notifications::{NotificationIngress, NotificationQueryService};
pub use users::UserService;
