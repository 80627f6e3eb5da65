//! API Routes
//!
//! Configures the Axum router with all service endpoints.

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    cache_contains_handler, cache_size_handler, cache_stats_handler, create_document_handler,
    create_user_handler, delete_document_handler, delete_user_handler, filter_documents_handler,
    filter_notifications_handler, filter_users_handler, get_document_handler, health_handler,
    inspect_cache_handler, stream_notifications_handler, submit_notification_handler,
    update_document_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/v1/api/users", post(create_user_handler))
        .route("/v1/api/users/filter", post(filter_users_handler))
        .route("/v1/api/users/:username", delete(delete_user_handler))
        .route("/v1/api/documents", post(create_document_handler))
        .route("/v1/api/documents/filter", post(filter_documents_handler))
        .route(
            "/v1/api/documents/:key",
            get(get_document_handler)
                .put(update_document_handler)
                .delete(delete_document_handler),
        )
        .route("/v1/api/notifications", post(submit_notification_handler))
        .route(
            "/v1/api/notifications/filter",
            post(filter_notifications_handler),
        )
        .route(
            "/v1/api/notifications/stream",
            get(stream_notifications_handler),
        )
        .route("/v1/api/cache/inspect/:cache_name", get(inspect_cache_handler))
        .route("/v1/api/cache/contains/:cache_name", get(cache_contains_handler))
        .route("/v1/api/cache/size/:cache_name", get(cache_size_handler))
        .route("/v1/api/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
