//! Response DTOs for the record API
//!
//! Defines the structure of outgoing HTTP response bodies.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::CacheStats;
use crate::models::{ListQuery, Record};
use crate::service::RecordPage;

/// Base path of the record endpoints, used when building links
pub const RECORDS_PATH: &str = "/api/v1/records";

/// A single record as returned to HTTP callers
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordResponse {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl From<Record> for RecordResponse {
    fn from(record: Record) -> Self {
        Self {
            id: record.id,
            message: record.message,
            created_at: record.created_at,
        }
    }
}

/// Hypermedia link attached to paged listings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkResponse {
    pub rel: String,
    pub href: String,
}

impl LinkResponse {
    fn new(rel: &str, href: String) -> Self {
        Self {
            rel: rel.to_string(),
            href,
        }
    }
}

/// Response body for GET /api/v1/records/list
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PagedRecordsResponse {
    pub items: Vec<RecordResponse>,
    pub page: i64,
    pub page_size: i64,
    /// Number of items on this page
    pub total_items: usize,
    pub links: Vec<LinkResponse>,
}

impl From<RecordPage> for PagedRecordsResponse {
    fn from(page: RecordPage) -> Self {
        let total_items = page.items.len();
        let links = build_links(&page.query, total_items);
        Self {
            items: page.items.into_iter().map(RecordResponse::from).collect(),
            page: page.query.page,
            page_size: page.query.page_size,
            total_items,
            links,
        }
    }
}

// == Links ==
/// Href of the listing for `page`, keeping ordering and filter of `query`.
fn list_href(query: &ListQuery, page: i64) -> String {
    let mut href = format!(
        "{RECORDS_PATH}/list?page={page}&pageSize={}&orderBy={}&desc={}",
        query.page_size, query.order_by, query.descending
    );
    if let Some(filter) = query.effective_filter() {
        href.push_str("&filter=");
        href.push_str(&urlencoding::encode(filter));
    }
    href
}

/// Builds `self`, `create`, and where applicable `prev`/`next` links.
pub fn build_links(query: &ListQuery, total_items: usize) -> Vec<LinkResponse> {
    let page = query.page;
    let mut links = vec![
        LinkResponse::new("self", list_href(query, page)),
        LinkResponse::new("create", RECORDS_PATH.to_string()),
    ];

    let total_pages = match usize::try_from(query.page_size) {
        Ok(page_size) if page_size > 0 => total_items.div_ceil(page_size),
        _ => 0,
    };
    let total_pages = i64::try_from(total_pages).unwrap_or(i64::MAX);

    if page > 1 && total_pages > 0 {
        links.push(LinkResponse::new("prev", list_href(query, page - 1)));
    }
    if page < total_pages {
        links.push(LinkResponse::new("next", list_href(query, page + 1)));
    }

    links
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub invalidations: u64,
    pub total_entries: usize,
    pub hit_rate: f64,
}

impl From<CacheStats> for StatsResponse {
    fn from(stats: CacheStats) -> Self {
        Self {
            hit_rate: stats.hit_rate(),
            hits: stats.hits,
            misses: stats.misses,
            evictions: stats.evictions,
            invalidations: stats.invalidations,
            total_entries: stats.total_entries,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
