//! API Handlers
//!
//! HTTP request handlers for each record endpoint. Handlers only translate
//! between HTTP and the `RecordService`; validation lives in the service.

use std::sync::Arc;
use tokio::sync::RwLock;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

use crate::cache::CacheStore;
use crate::error::Result;
use crate::models::{
    CreateRecordRequest, ErrorResponse, HealthResponse, ListParams, PagedRecordsResponse, Record,
    RecordResponse, StatsResponse,
};
use crate::service::RecordService;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<RecordService>,
    /// Cache table behind the service, read by `/stats`
    pub cache: Arc<RwLock<CacheStore>>,
}

impl AppState {
    pub fn new(service: RecordService, cache: Arc<RwLock<CacheStore>>) -> Self {
        Self {
            service: Arc::new(service),
            cache,
        }
    }
}

fn record_or_not_found(record: Option<Record>) -> Response {
    match record {
        Some(record) => Json(RecordResponse::from(record)).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Record not found")),
        )
            .into_response(),
    }
}

/// Handler for GET /api/v1/records
///
/// Returns the most recently created record, or 404 when there is none.
pub async fn latest_handler(State(state): State<AppState>) -> Result<Response> {
    let record = state.service.get_latest().await?;
    Ok(record_or_not_found(record))
}

/// Handler for GET /api/v1/records/:id
pub async fn get_by_id_handler(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Response> {
    let record = state.service.get_by_id(id).await?;
    Ok(record_or_not_found(record))
}

/// Handler for GET /api/v1/records/list
///
/// Query parameters: `page`, `pageSize`, `orderBy`, `desc`, `filter`.
pub async fn list_handler(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<Json<PagedRecordsResponse>> {
    let page = state.service.list(params.into()).await?;
    Ok(Json(PagedRecordsResponse::from(page)))
}

/// Handler for GET /api/v1/records/all
pub async fn list_all_handler(State(state): State<AppState>) -> Result<Json<Vec<RecordResponse>>> {
    let records = state.service.list_all().await?;
    Ok(Json(records.into_iter().map(RecordResponse::from).collect()))
}

/// Handler for POST /api/v1/records
///
/// Creates a record from `{"message": ...}` and answers 201 with the stored record.
pub async fn create_handler(
    State(state): State<AppState>,
    Json(req): Json<CreateRecordRequest>,
) -> Result<(StatusCode, Json<RecordResponse>)> {
    let record = state.service.save(req.message.map(Record::new)).await?;
    Ok((StatusCode::CREATED, Json(RecordResponse::from(record))))
}

/// Handler for GET /stats
///
/// Returns read-through cache statistics.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    let cache = state.cache.read().await;
    Json(StatsResponse::from(cache.stats()))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
