//! Domain model and request/response DTOs
//!
//! `Record` and `ListQuery` are shared by every layer; the request and
//! response types only concern the HTTP surface.

pub mod record;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use record::{ListQuery, OrderBy, Record, MAX_MESSAGE_LENGTH};
pub use requests::{CreateRecordRequest, ListParams};
pub use responses::{
    ErrorResponse, HealthResponse, LinkResponse, PagedRecordsResponse, RecordResponse,
    StatsResponse,
};
