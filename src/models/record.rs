//! Record domain model
//!
//! The single entity persisted by every storage engine, plus the listing query shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum allowed message length in characters
pub const MAX_MESSAGE_LENGTH: usize = 200;

// == Record ==
/// A persisted message.
///
/// `id == 0` means the record has not been saved yet. Stores overwrite both
/// `id` and `created_at` on save.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: i64,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Creates an unsaved record carrying only a message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            id: 0,
            message: message.into(),
            created_at: Utc::now(),
        }
    }

    /// Returns true once a store has assigned an identifier.
    pub fn is_persisted(&self) -> bool {
        self.id > 0
    }
}

// == Order By ==
/// Field a listing is sorted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OrderBy {
    Message,
    #[default]
    CreatedAt,
}

impl OrderBy {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderBy::Message => "message",
            OrderBy::CreatedAt => "createdAt",
        }
    }
}

impl fmt::Display for OrderBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderBy {
    type Err = std::convert::Infallible;

    /// Anything other than `message` sorts by creation time.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("message") {
            Ok(OrderBy::Message)
        } else {
            Ok(OrderBy::CreatedAt)
        }
    }
}

// == List Query ==
/// Paging, ordering and filtering parameters for `list`.
///
/// Pages are 1-based. Values are passed through unclamped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub page: i64,
    pub page_size: i64,
    pub order_by: OrderBy,
    pub descending: bool,
    pub filter: Option<String>,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: 10,
            order_by: OrderBy::CreatedAt,
            descending: true,
            filter: None,
        }
    }
}

impl ListQuery {
    pub fn new(page: i64, page_size: i64, order_by: OrderBy, descending: bool) -> Self {
        Self {
            page,
            page_size,
            order_by,
            descending,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// Filter text, ignoring blank values.
    pub fn effective_filter(&self) -> Option<&str> {
        self.filter.as_deref().filter(|f| !f.trim().is_empty())
    }

    /// Returns `(offset, limit)`, or `None` when page or page size is not positive.
    pub fn window(&self) -> Option<(usize, usize)> {
        if self.page < 1 || self.page_size < 1 {
            return None;
        }
        let offset = (self.page - 1).checked_mul(self.page_size)?;
        Some((
            usize::try_from(offset).ok()?,
            usize::try_from(self.page_size).ok()?,
        ))
    }
}
