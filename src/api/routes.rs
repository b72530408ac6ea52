//! API Routes
//!
//! Configures the Axum router with the cache admin endpoints.

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_handler, delete_entry_handler, get_settings_handler, health_handler,
    invalidate_handler, invalidate_resource_handler, resource_ttl_handler, stats_handler,
    update_settings_handler, AppState,
};

/// Creates the admin router with all endpoints configured.
///
/// # Endpoints
/// - `GET /health` - Health check endpoint
/// - `GET /stats` - Cache performance counters
/// - `GET /settings` / `PUT /settings` - Global cache settings
/// - `PUT /resource-ttl` - Per-resource TTL override
/// - `POST /invalidate` - Pattern invalidation
/// - `POST /invalidate/resource` - Resource-family invalidation
/// - `DELETE /entries/:key` - Remove one entry
/// - `DELETE /entries` - Clear the cache
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route("/health", get(health_handler))
        .route("/stats", get(stats_handler))
        .route(
            "/settings",
            get(get_settings_handler).put(update_settings_handler),
        )
        .route("/resource-ttl", put(resource_ttl_handler))
        .route("/invalidate", post(invalidate_handler))
        .route("/invalidate/resource", post(invalidate_resource_handler))
        .route("/entries/:key", delete(delete_entry_handler))
        .route("/entries", delete(clear_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::from_config(&Config::default()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_invalidate_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/invalidate")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"pattern":"^machine:"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_delete_entry_not_found() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/entries/nonexistent")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
