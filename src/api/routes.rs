//! API Routes
//!
//! Configures the Axum router with all record endpoints.

use axum::{http::HeaderName, routing::get, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use super::handlers::{
    create_handler, get_by_id_handler, health_handler, latest_handler, list_all_handler,
    list_handler, stats_handler, AppState,
};

/// Header carrying the per-request correlation id
pub const CORRELATION_ID_HEADER: &str = "x-correlation-id";

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - Correlation id: taken from `x-correlation-id` or generated, echoed on the response
/// - Tracing: Logs all requests
/// - CORS: Allows any origin
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let correlation_id = HeaderName::from_static(CORRELATION_ID_HEADER);

    Router::new()
        .route("/api/v1/records", get(latest_handler).post(create_handler))
        .route("/api/v1/records/list", get(list_handler))
        .route("/api/v1/records/all", get(list_all_handler))
        .route("/api/v1/records/:id", get(get_by_id_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(PropagateRequestIdLayer::new(correlation_id.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(correlation_id, MakeRequestUuid))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tokio::sync::RwLock;
    use tower::util::ServiceExt;

    use crate::cache::{CacheStore, CachedStore};
    use crate::service::RecordService;
    use crate::store::MemoryStore;

    fn create_test_app() -> Router {
        let cache = Arc::new(RwLock::new(CacheStore::new(100, Duration::from_secs(300))));
        let store = CachedStore::new(MemoryStore::new(), cache.clone());
        create_router(AppState::new(RecordService::new(Arc::new(store)), cache))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_correlation_id_is_generated() {
        let app = create_test_app();

        let response = app
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        let id = response.headers().get(CORRELATION_ID_HEADER).unwrap();
        assert!(!id.is_empty());
    }

    #[tokio::test]
    async fn test_correlation_id_is_echoed() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(CORRELATION_ID_HEADER, "abc-123")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(
            response.headers().get(CORRELATION_ID_HEADER).unwrap(),
            "abc-123"
        );
    }

    #[tokio::test]
    async fn test_latest_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/records")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_list_route_is_not_captured_by_id() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/records/list")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_rejected() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/v1/records/abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
