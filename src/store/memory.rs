//! In-memory record store
//!
//! Process-local engine used for development and tests.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{query, RecordStore};
use crate::error::Result;
use crate::models::{ListQuery, Record};

// == Memory Store ==
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn get_latest(&self) -> Result<Option<Record>> {
        Ok(query::latest(&self.records.read().await))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let records = self.records.read().await;
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, list_query: &ListQuery) -> Result<Vec<Record>> {
        Ok(query::page(&self.records.read().await, list_query))
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        Ok(query::all_newest_first(&self.records.read().await))
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        // Id assignment and insert happen under one write lock.
        let mut records = self.records.write().await;
        record.id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        record.created_at = Utc::now();
        records.push(record.clone());
        Ok(record)
    }
}
