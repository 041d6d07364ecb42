//! Request DTOs for the record API
//!
//! Defines the structure of incoming HTTP request bodies and query strings.

use serde::Deserialize;

use crate::models::{ListQuery, OrderBy};

/// Request body for creating a record (POST /api/v1/records)
///
/// `message` is optional so a missing field reaches validation instead of
/// failing deserialization.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    #[serde(default)]
    pub message: Option<String>,
}

/// Query string for GET /api/v1/records/list
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_page_size")]
    pub page_size: i64,
    #[serde(default)]
    pub order_by: Option<String>,
    #[serde(default = "default_desc")]
    pub desc: bool,
    #[serde(default)]
    pub filter: Option<String>,
}

fn default_page() -> i64 {
    1
}

fn default_page_size() -> i64 {
    10
}

fn default_desc() -> bool {
    true
}

impl From<ListParams> for ListQuery {
    fn from(params: ListParams) -> Self {
        let order_by = params
            .order_by
            .as_deref()
            .and_then(|s| s.parse::<OrderBy>().ok())
            .unwrap_or_default();

        ListQuery {
            page: params.page,
            page_size: params.page_size,
            order_by,
            descending: params.desc,
            filter: params.filter,
        }
    }
}
