//! Record Store Module
//!
//! The storage contract shared by every engine and every decorator, plus the
//! concrete engines and the startup-time provider selector.

mod document;
mod memory;
pub mod query;
mod selector;
mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{ListQuery, Record};

// Re-export public types
pub use document::DocumentStore;
pub use memory::MemoryStore;
pub use selector::{select, PersistenceConfig, Provider};
pub use sqlite::SqliteStore;

// == Record Store ==
/// CRUD contract implemented by storage engines and by the layers that wrap them.
///
/// Any implementation may wrap any other, so cache and resilience layers
/// stack in whichever order the caller composes them.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Most recent record by creation time, or `None` when empty.
    async fn get_latest(&self) -> Result<Option<Record>>;

    /// Exact identifier match, or `None`.
    async fn get_by_id(&self, id: i64) -> Result<Option<Record>>;

    /// One page of records, filtered and ordered as the query asks.
    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>>;

    /// Every record, newest first.
    async fn list_all(&self) -> Result<Vec<Record>>;

    /// Assigns id and creation time, persists, and returns the completed record.
    async fn save(&self, record: Record) -> Result<Record>;
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Box<T> {
    async fn get_latest(&self) -> Result<Option<Record>> {
        (**self).get_latest().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        (**self).get_by_id(id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        (**self).list(query).await
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        (**self).list_all().await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        (**self).save(record).await
    }
}

#[async_trait]
impl<T: RecordStore + ?Sized> RecordStore for Arc<T> {
    async fn get_latest(&self) -> Result<Option<Record>> {
        (**self).get_latest().await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        (**self).get_by_id(id).await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        (**self).list(query).await
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        (**self).list_all().await
    }

    async fn save(&self, record: Record) -> Result<Record> {
        (**self).save(record).await
    }
}
