//! Store Selector
//!
//! Maps a configured provider name onto one of the supported engines.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tracing::info;

use super::{DocumentStore, MemoryStore, RecordStore, SqliteStore};
use crate::error::{Result, StoreError};

/// Engine-specific connection settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceConfig {
    /// Selected provider name
    pub provider: Option<String>,
    /// SQLite database path
    pub sqlite_path: Option<String>,
    /// Directory holding document collections
    pub document_dir: Option<PathBuf>,
    /// Document collection name
    pub document_collection: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            provider: None,
            sqlite_path: None,
            document_dir: None,
            document_collection: "records".to_string(),
        }
    }
}

// == Provider ==
/// The closed set of storage engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Sqlite,
    Document,
    Memory,
}

impl Provider {
    pub const ALL: [Provider; 3] = [Provider::Sqlite, Provider::Document, Provider::Memory];

    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Sqlite => "sqlite",
            Provider::Document => "document",
            Provider::Memory => "memory",
        }
    }

    /// Constructs this provider's engine from `config`.
    pub async fn build(self, config: &PersistenceConfig) -> Result<Box<dyn RecordStore>> {
        match self {
            Provider::Sqlite => {
                let path = config
                    .sqlite_path
                    .as_deref()
                    .filter(|p| !p.trim().is_empty())
                    .ok_or_else(|| {
                        StoreError::Configuration("SQLITE_PATH is required for sqlite".into())
                    })?;
                let path = path.to_string();
                let store = tokio::task::spawn_blocking(move || SqliteStore::open(&path))
                    .await
                    .map_err(|err| StoreError::Store(format!("SQLite open task failed: {err}")))??;
                Ok(Box::new(store))
            }
            Provider::Document => {
                let dir = config.document_dir.as_ref().ok_or_else(|| {
                    StoreError::Configuration("DOCUMENT_DIR is required for document".into())
                })?;
                Ok(Box::new(
                    DocumentStore::open(dir, &config.document_collection).await?,
                ))
            }
            Provider::Memory => Ok(Box::new(MemoryStore::new())),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        let name = s.trim();
        if name.is_empty() {
            return Err(StoreError::Configuration(
                "persistence provider must be specified".to_string(),
            ));
        }
        Provider::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| StoreError::UnsupportedProvider(name.to_string()))
    }
}

// == Select ==
/// Picks and opens the engine named by `provider`.
///
/// # Errors
/// - `Configuration` when the name is missing/blank or engine settings are absent
/// - `UnsupportedProvider` when the name is outside the supported set
pub async fn select(
    provider: Option<&str>,
    config: &PersistenceConfig,
) -> Result<Box<dyn RecordStore>> {
    let provider: Provider = provider
        .ok_or_else(|| {
            StoreError::Configuration("persistence provider must be specified".to_string())
        })?
        .parse()?;

    let store = provider.build(config).await?;
    info!("Persistence provider selected: {}", provider);
    Ok(store)
}
