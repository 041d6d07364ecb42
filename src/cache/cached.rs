//! Read-Through Cache
//!
//! A `RecordStore` decorator that answers reads from `CacheStore` when it can
//! and invalidates point entries on writes.

use std::sync::Arc;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::RwLock;
use tracing::debug;

use crate::cache::{keys, CacheStore};
use crate::error::Result;
use crate::models::{ListQuery, Record};
use crate::store::RecordStore;

// == Cached Store ==
pub struct CachedStore<S> {
    inner: S,
    cache: Arc<RwLock<CacheStore>>,
    /// Also drop listing entries on save
    invalidate_listings: bool,
}

impl<S: RecordStore> CachedStore<S> {
    /// Wraps `inner`, sharing `cache` with any other holder (e.g. the cleanup task).
    pub fn new(inner: S, cache: Arc<RwLock<CacheStore>>) -> Self {
        Self {
            inner,
            cache,
            invalidate_listings: false,
        }
    }

    /// When enabled, `save` also drops every `list:*` entry and `all`.
    pub fn with_listing_invalidation(mut self, enabled: bool) -> Self {
        self.invalidate_listings = enabled;
        self
    }

    pub fn cache(&self) -> Arc<RwLock<CacheStore>> {
        Arc::clone(&self.cache)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Cached value for `key`. A payload that fails to decode is an error.
    async fn lookup<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let cached = self.cache.write().await.get(key);
        match cached {
            Some(raw) => {
                debug!("Cache hit: key={}", key);
                Ok(Some(serde_json::from_str(&raw)?))
            }
            None => {
                debug!("Cache miss: key={}", key);
                Ok(None)
            }
        }
    }

    async fn remember<T: Serialize>(&self, key: String, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.cache.write().await.set(key, raw);
        Ok(())
    }

    async fn invalidate_after_save(&self, id: i64) {
        let mut cache = self.cache.write().await;
        let mut removed = usize::from(cache.invalidate(keys::LATEST));
        removed += usize::from(cache.invalidate(&keys::by_id(id)));
        if self.invalidate_listings {
            removed += cache.invalidate_prefix(keys::LIST_PREFIX);
            removed += usize::from(cache.invalidate(keys::ALL));
        }
        debug!("Cache invalidated after save: id={}, entries={}", id, removed);
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for CachedStore<S> {
    async fn get_latest(&self) -> Result<Option<Record>> {
        if let Some(record) = self.lookup::<Record>(keys::LATEST).await? {
            return Ok(Some(record));
        }

        let latest = self.inner.get_latest().await?;
        if let Some(record) = &latest {
            self.remember(keys::LATEST.to_string(), record).await?;
        }
        Ok(latest)
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let key = keys::by_id(id);
        if let Some(record) = self.lookup::<Record>(&key).await? {
            return Ok(Some(record));
        }

        let found = self.inner.get_by_id(id).await?;
        if let Some(record) = &found {
            self.remember(key, record).await?;
        }
        Ok(found)
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        let key = keys::list(query);
        if let Some(records) = self.lookup::<Vec<Record>>(&key).await? {
            return Ok(records);
        }

        let records = self.inner.list(query).await?;
        self.remember(key, &records).await?;
        Ok(records)
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        if let Some(records) = self.lookup::<Vec<Record>>(keys::ALL).await? {
            return Ok(records);
        }

        let records = self.inner.list_all().await?;
        self.remember(keys::ALL.to_string(), &records).await?;
        Ok(records)
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let saved = self.inner.save(record).await?;
        self.invalidate_after_save(saved.id).await;
        Ok(saved)
    }
}
