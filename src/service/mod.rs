//! Record Service
//!
//! Entry point for callers. Validates input before any store call, delegates
//! to the composed store stack, and logs every outcome.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::error::{Result, StoreError};
use crate::models::{ListQuery, Record, MAX_MESSAGE_LENGTH};
use crate::store::RecordStore;


/// One page of a listing, echoing the query that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordPage {
    pub query: ListQuery,
    pub items: Vec<Record>,
}

// == Record Service ==
/// Validating front for a `RecordStore`.
///
/// The store is usually a `ResilientStore` wrapping a `CachedStore`, but any
/// implementation works.
#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Returns the most recently created record, or `None` for an empty store.
    pub async fn get_latest(&self) -> Result<Option<Record>> {
        match self.store.get_latest().await {
            Ok(record) => {
                info!(found = record.is_some(), "Fetched latest record");
                Ok(record)
            }
            Err(err) => {
                error!("Failed to fetch latest record: {}", err);
                Err(err)
            }
        }
    }

    /// Looks up a record by identifier.
    ///
    /// # Errors
    /// `Validation` when `id <= 0`; the store is not called in that case.
    pub async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        validate_id(id)?;

        match self.store.get_by_id(id).await {
            Ok(record) => {
                info!(id, found = record.is_some(), "Fetched record by id");
                Ok(record)
            }
            Err(err) => {
                error!(id, "Failed to fetch record: {}", err);
                Err(err)
            }
        }
    }

    pub async fn list(&self, query: ListQuery) -> Result<RecordPage> {
        match self.store.list(&query).await {
            Ok(items) => {
                info!(
                    page = query.page,
                    page_size = query.page_size,
                    count = items.len(),
                    "Listed records"
                );
                Ok(RecordPage { query, items })
            }
            Err(err) => {
                error!(page = query.page, "Failed to list records: {}", err);
                Err(err)
            }
        }
    }

    pub async fn list_all(&self) -> Result<Vec<Record>> {
        match self.store.list_all().await {
            Ok(items) => {
                info!(count = items.len(), "Listed all records");
                Ok(items)
            }
            Err(err) => {
                error!("Failed to list all records: {}", err);
                Err(err)
            }
        }
    }

    /// Persists a record and returns it with the assigned id and timestamp.
    ///
    /// # Errors
    /// `Validation` for a missing record, a blank message, a message longer
    /// than `MAX_MESSAGE_LENGTH` characters, or a store that hands back a
    /// non-positive id.
    pub async fn save(&self, record: Option<Record>) -> Result<Record> {
        let record = match record {
            Some(record) => record,
            None => return Err(rejected("record is required")),
        };
        validate_message(&record.message)?;

        let saved = match self.store.save(record).await {
            Ok(saved) => saved,
            Err(err) => {
                error!("Failed to save record: {}", err);
                return Err(err);
            }
        };

        if let Err(err) = validate_id(saved.id) {
            error!(id = saved.id, "Store returned an invalid identifier");
            return Err(err);
        }

        info!(id = saved.id, "Saved record");
        Ok(saved)
    }

    /// Builds a fresh record from `message` and saves it.
    pub async fn create(&self, message: impl Into<String>) -> Result<Record> {
        self.save(Some(Record::new(message))).await
    }
}

// == Validation ==
fn rejected(reason: &str) -> StoreError {
    warn!("Rejected request: {}", reason);
    StoreError::Validation(reason.to_string())
}

fn validate_id(id: i64) -> Result<()> {
    if id <= 0 {
        return Err(rejected("identifier must be greater than zero"));
    }
    Ok(())
}

fn validate_message(message: &str) -> Result<()> {
    if message.trim().is_empty() {
        return Err(rejected("message must not be empty"));
    }
    if message.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(rejected("message must be at most 200 characters"));
    }
    Ok(())
}
