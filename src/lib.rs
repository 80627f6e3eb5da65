//! Docnotify - document service with an asynchronous notification pipeline
//!
//! Document mutations keep a multi-key document cache consistent and emit
//! notifications through a queue; an ingestor persists them and pushes them
//! to live subscribers.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod queue;
pub mod services;
pub mod storage;
pub mod tasks;

pub use api::{create_router, AppState};
pub use config::Config;
pub use error::{AppError, Result};
pub use tasks::spawn_ingestor_task;
