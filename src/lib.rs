//! Greeting Store - a record store service
//!
//! Persists short messages behind a read-through cache and a retry, timeout
//! and circuit-breaker wrapper, with SQLite, JSON-lines document and
//! in-memory engines selected at startup.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resilience;
pub mod service;
pub mod store;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{Result, StoreError};
pub use service::{RecordPage, RecordService};
pub use store::RecordStore;
pub use tasks::spawn_cleanup_task;
