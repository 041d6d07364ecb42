//! SQLite record store
//!
//! Relational engine backed by rusqlite. Every statement runs on tokio's
//! blocking pool; the connection is guarded by a mutex.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::info;

use super::RecordStore;
use crate::error::{Result, StoreError};
use crate::models::{ListQuery, OrderBy, Record};

const SCHEMA_SQL: &str = "CREATE TABLE IF NOT EXISTS records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    message TEXT NOT NULL CHECK (length(message) <= 200),
    created_at INTEGER NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_records_created_at ON records (created_at);";

const RECORD_SELECT_SQL: &str = "SELECT id, message, created_at FROM records";

// == Sqlite Store ==
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl std::fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Opens a database file (created if missing) and ensures the schema.
    ///
    /// `":memory:"` opens a private in-memory database.
    pub fn open(path: &str) -> Result<Self> {
        if path.trim().is_empty() {
            return Err(StoreError::Validation(
                "SQLite path must not be empty".to_string(),
            ));
        }

        let conn = Connection::open(path).map_err(|err| {
            StoreError::Connection(format!("cannot open SQLite database '{path}': {err}"))
        })?;
        conn.execute_batch(SCHEMA_SQL)?;
        info!("SQLite store opened: path={}", path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Opens a private in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::open(":memory:")
    }

    /// Runs `f` against the connection on the blocking pool.
    async fn run<T, F>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let guard = conn.lock();
            f(&guard)
        })
        .await
        .map_err(|err| StoreError::Store(format!("SQLite task failed: {err}")))?
    }
}

fn row_to_record(row: &Row<'_>) -> rusqlite::Result<Record> {
    let micros: i64 = row.get(2)?;
    let created_at = DateTime::<Utc>::from_timestamp_micros(micros).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Integer,
            format!("timestamp out of range: {micros}").into(),
        )
    })?;

    Ok(Record {
        id: row.get(0)?,
        message: row.get(1)?,
        created_at,
    })
}

/// Escapes LIKE wildcards so the filter matches literally.
fn like_pattern(filter: &str) -> String {
    let mut escaped = String::with_capacity(filter.len() + 2);
    escaped.push('%');
    for c in filter.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

fn list_sql(query: &ListQuery, filtered: bool) -> String {
    let column = match query.order_by {
        OrderBy::Message => "message",
        OrderBy::CreatedAt => "created_at",
    };
    let direction = if query.descending { "DESC" } else { "ASC" };

    // LIKE is case-insensitive for ASCII only.
    let filter = if filtered {
        " WHERE message LIKE ?1 ESCAPE '\\'"
    } else {
        ""
    };
    let (limit, offset) = if filtered { ("?2", "?3") } else { ("?1", "?2") };

    format!(
        "{RECORD_SELECT_SQL}{filter} ORDER BY {column} {direction}, id {direction} LIMIT {limit} OFFSET {offset}"
    )
}

#[async_trait]
impl RecordStore for SqliteStore {
    async fn get_latest(&self) -> Result<Option<Record>> {
        self.run(|conn| {
            conn.query_row(
                &format!("{RECORD_SELECT_SQL} ORDER BY created_at DESC, id DESC LIMIT 1"),
                [],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
        })
        .await
    }

    async fn get_by_id(&self, id: i64) -> Result<Option<Record>> {
        self.run(move |conn| {
            conn.query_row(
                &format!("{RECORD_SELECT_SQL} WHERE id = ?1"),
                [id],
                row_to_record,
            )
            .optional()
            .map_err(Into::into)
        })
        .await
    }

    async fn list(&self, query: &ListQuery) -> Result<Vec<Record>> {
        let Some((offset, limit)) = query.window() else {
            return Ok(Vec::new());
        };
        let filter = query.effective_filter().map(like_pattern);
        let sql = list_sql(query, filter.is_some());
        let (offset, limit) = (offset as i64, limit as i64);

        self.run(move |conn| {
            let mut stmt = conn.prepare(&sql)?;
            let rows = match &filter {
                Some(pattern) => stmt.query_map(params![pattern, limit, offset], row_to_record)?,
                None => stmt.query_map(params![limit, offset], row_to_record)?,
            };
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
        })
        .await
    }

    async fn list_all(&self) -> Result<Vec<Record>> {
        self.run(|conn| {
            let mut stmt =
                conn.prepare(&format!("{RECORD_SELECT_SQL} ORDER BY created_at DESC, id DESC"))?;
            let rows = stmt.query_map([], row_to_record)?;
            rows.collect::<rusqlite::Result<Vec<_>>>().map_err(Into::into)
        })
        .await
    }

    async fn save(&self, mut record: Record) -> Result<Record> {
        self.run(move |conn| {
            // Stored precision is microseconds; return exactly what was written.
            let now = Utc::now().timestamp_micros();
            conn.execute(
                "INSERT INTO records (message, created_at) VALUES (?1, ?2)",
                params![record.message, now],
            )?;
            record.id = conn.last_insert_rowid();
            record.created_at = DateTime::<Utc>::from_timestamp_micros(now).unwrap_or_else(Utc::now);
            Ok(record)
        })
        .await
    }
}
