//! Error types for the record store
//!
//! Provides unified error handling using thiserror.

use std::time::Duration;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Store Error Enum ==
/// Unified error type for every layer of the persistence stack.
///
/// "Not found" is deliberately absent: lookups return `Ok(None)`.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Bad caller input, rejected before any I/O
    #[error("Validation error: {0}")]
    Validation(String),

    /// Missing or malformed provider setup
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Provider name outside the supported set
    #[error("Unsupported persistence provider: '{0}'")]
    UnsupportedProvider(String),

    /// Underlying store could not be reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Underlying store failed while executing an operation
    #[error("Store error: {0}")]
    Store(String),

    /// A single attempt exceeded its time budget
    #[error("Operation timed out after {0:?}")]
    Timeout(Duration),

    /// Circuit breaker is open; the store was not called
    #[error("Circuit open: the record store is temporarily unavailable")]
    CircuitOpen,

    /// Every attempt failed; carries the last underlying error
    #[error("Operation failed after {attempts} attempts: {source}")]
    RetriesExhausted {
        attempts: u32,
        #[source]
        source: Box<StoreError>,
    },

    /// Cached payload could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl StoreError {
    // == Transient ==
    /// Returns true for failures worth retrying and counting against the breaker.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StoreError::Connection(_) | StoreError::Store(_) | StoreError::Timeout(_)
        )
    }

    fn status_code(&self) -> StatusCode {
        match self {
            StoreError::Validation(_) => StatusCode::BAD_REQUEST,
            StoreError::CircuitOpen
            | StoreError::Connection(_)
            | StoreError::Timeout(_)
            | StoreError::RetriesExhausted { .. } => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Configuration(_)
            | StoreError::UnsupportedProvider(_)
            | StoreError::Store(_)
            | StoreError::Serialization(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(failure, _)
                if matches!(
                    failure.code,
                    rusqlite::ErrorCode::CannotOpen
                        | rusqlite::ErrorCode::DatabaseBusy
                        | rusqlite::ErrorCode::DatabaseLocked
                ) =>
            {
                StoreError::Connection(err.to_string())
            }
            _ => StoreError::Store(err.to_string()),
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the record store.
pub type Result<T> = std::result::Result<T, StoreError>;
