//! Cache key derivation
//!
//! Keys are a pure function of the query shape, so equal queries share an entry.

use crate::models::ListQuery;

/// Key for the most recent record
pub const LATEST: &str = "last";

/// Key for the full newest-first listing
pub const ALL: &str = "all";

/// Prefix shared by every paged-listing key
pub const LIST_PREFIX: &str = "list:";

pub fn by_id(id: i64) -> String {
    format!("by-id:{id}")
}

/// `list:{page}:{pageSize}:{orderBy}:{desc}:{filter}`; a blank filter renders empty.
pub fn list(query: &ListQuery) -> String {
    format!(
        "{LIST_PREFIX}{}:{}:{}:{}:{}",
        query.page,
        query.page_size,
        query.order_by,
        query.descending,
        query.effective_filter().unwrap_or("")
    )
}
