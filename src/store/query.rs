//! In-process query evaluation
//!
//! Latest/list/paging semantics for engines that keep their working set in
//! memory. The SQLite engine expresses the same rules in SQL.

use std::cmp::Ordering;

use crate::models::{ListQuery, OrderBy, Record};

/// Newest-first comparison: later `created_at` wins, higher id breaks ties.
fn newest_first(a: &Record, b: &Record) -> Ordering {
    b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id))
}

/// Returns the most recently created record.
pub fn latest(records: &[Record]) -> Option<Record> {
    records.iter().min_by(|a, b| newest_first(a, b)).cloned()
}

/// Returns every record, newest first.
pub fn all_newest_first(records: &[Record]) -> Vec<Record> {
    let mut out = records.to_vec();
    out.sort_by(newest_first);
    out
}

/// Case-insensitive substring match on the message.
pub fn matches_filter(record: &Record, needle_lower: &str) -> bool {
    record.message.to_lowercase().contains(needle_lower)
}

/// Applies filter, ordering and the page window of `query`.
pub fn page(records: &[Record], query: &ListQuery) -> Vec<Record> {
    let Some((offset, limit)) = query.window() else {
        return Vec::new();
    };

    let needle = query.effective_filter().map(str::to_lowercase);
    let mut selected: Vec<&Record> = records
        .iter()
        .filter(|r| needle.as_deref().map_or(true, |n| matches_filter(r, n)))
        .collect();

    selected.sort_by(|a, b| {
        let ord = match query.order_by {
            OrderBy::Message => a.message.cmp(&b.message),
            OrderBy::CreatedAt => a.created_at.cmp(&b.created_at),
        }
        .then(a.id.cmp(&b.id));
        if query.descending {
            ord.reverse()
        } else {
            ord
        }
    });

    selected
        .into_iter()
        .skip(offset)
        .take(limit)
        .cloned()
        .collect()
}
