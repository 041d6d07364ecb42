//! Document record store
//!
//! Stores each record as one JSON document per line in
//! `{dir}/{collection}.jsonl`. The collection is append-only; the working set
//! is loaded at open and kept in memory for reads.
//!
//! Appends run on a spawned task, so a caller that stops waiting cannot leave
//! a line on disk that the working set does not know about.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::{query, RecordStore};
use crate::error::{Result, StoreError};
use crate::models::{ListQuery, Record};

#[derive(Debug)]
struct Collection {
    records: Vec<Record>,
    /// Next identifier to hand out; never decreases
    next_id: i64,
}

impl Collection {
    fn new(records: Vec<Record>) -> Self {
        let next_id = records.iter().map(|r| r.id).max().unwrap_or(0) + 1;
        Self { records, next_id }
    }
}

// == Document Store ==
#[derive(Debug)]
pub struct DocumentStore {
    /// Collection file path
    path: Arc<PathBuf>,
    /// Loaded documents; the write lock also serializes appends
    collection: Arc<RwLock<Collection>>,
}

impl DocumentStore {
    // == Constructor ==
    /// Opens (or starts) the collection `collection` inside `dir`.
    ///
    /// # Errors
    /// - `Validation` when either argument is blank
    /// - `Connection` when `dir` is not an accessible directory
    /// - `Store` when an existing document cannot be parsed
    pub async fn open(dir: impl AsRef<Path>, collection: &str) -> Result<Self> {
        let dir = dir.as_ref();
        if dir.as_os_str().is_empty() || dir.to_string_lossy().trim().is_empty() {
            return Err(StoreError::Validation(
                "document store directory must not be empty".to_string(),
            ));
        }
        if collection.trim().is_empty() {
            return Err(StoreError::Validation(
                "document collection name must not be empty".to_string(),
            ));
        }

        let meta = fs::metadata(dir).await.map_err(io_error)?;
        if !meta.is_dir() {
            return Err(StoreError::Connection(format!(
                "{} is not a directory",
                dir.display()
            )));
        }

        let path = dir.join(format!("{}.jsonl", collection.trim()));
        let records = load(&path).await?;
        info!(
            "Document collection opened: path={}, documents={}",
            path.display(),
            records.len()
        );

        Ok(Self {
            path: Arc::new(path),
            collection: Arc::new(RwLock::new(Collection::new(records))),
        })
    }

    /// Path of the backing collection file.
    pub fn path(&self) -> &Path {
        self.path.as_path()
    }
}

async fn append(
    path: &Path,
    collection: &RwLock<Collection>,
    mut record: Record,
) -> Result<Record> {
    let mut collection = collection.write().await;
    // Reserved before writing: a failed append may still leave bytes behind.
    record.id = collection.next_id;
    collection.next_id += 1;
    record.created_at = Utc::now();

    let mut line = serde_json::to_string(&record)?;
    line.push('\n');

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await
        .map_err(io_error)?;
    file.write_all(line.as_bytes()).await.map_err(io_error)?;
    file.flush().await.map_err(io_error)?;

    debug!("Document appended: id={}", record.id);
    collection.records.push(record.clone());
    Ok(record)
}

async fn load(path: &Path) -> Result<Vec<Record>> {
    let raw = match fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(io_error(err)),
    };

    raw.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(n, line)| {
            serde_json::from_str::<Record>(line).map_err(|err| {
                StoreError::Store(format!(
                    "corrupt document at {}:{}: {}",
                    path.display(),
                    n + 1,
                    err
                ))
            })
        })
        .collect()
}

fn io_error(err: std::io::Error) -> StoreError {
    match err.kind() {
        ErrorKind::NotFound | ErrorKind::PermissionDenied | ErrorKind::ConnectionRefused => {
            StoreError::Connection(err.to_string())
        }
        _ => StoreError::Store(err.to_string()),
    }
}

#[async_trait]
impl RecordStore for DocumentStore {
    async fn get_latest(&self) -> Result<Option<Record>> {
        Ok(query::latest(&self.collection.read().await.records))
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        let collection = self.collection.read().await;
        Ok(collection.records.iter().find(|r| r.id == id).cloned())
    }

    async fn list(&self, list_query: &ListQuery) -> Result<Vec<Record>> {
        Ok(query::page(&self.collection.read().await.records, list_query))
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        Ok(query::all_newest_first(&self.collection.read().await.records))
    }

    async fn save(&self, record: Record) -> Result<Record> {
        let path = Arc::clone(&self.path);
        let collection = Arc::clone(&self.collection);

        tokio::spawn(async move { append(&path, &collection, record).await })
            .await
            .map_err(|err| StoreError::Store(format!("document append task failed: {err}")))?
    }
}
