//! API Module
//!
//! HTTP handlers and routing for the record REST API.
//!
//! # Endpoints
//! - `GET /api/v1/records` - Latest record
//! - `GET /api/v1/records/:id` - Record by identifier
//! - `GET /api/v1/records/list` - Paged, filtered, ordered listing
//! - `GET /api/v1/records/all` - Every record, newest first
//! - `POST /api/v1/records` - Create a record
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::{create_router, CORRELATION_ID_HEADER};
