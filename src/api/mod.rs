//! API Module
//!
//! HTTP handlers and routing for the document and notification REST API.
//!
//! # Endpoints
//! - `/v1/api/users` - create, delete and filter users
//! - `/v1/api/documents` - document mutations, lookup by key and filtered queries
//! - `/v1/api/notifications` - queued submission, filtered queries and the live stream
//! - `/v1/api/cache` - cache inspection
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
