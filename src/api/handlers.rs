//! API Handlers
//!
//! HTTP request handlers for the user, document, notification and cache
//! endpoints, plus the shared application state they run against.

use std::collections::BTreeMap;
use std::convert::Infallible;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use serde::Deserialize;
use tokio_stream::{Stream, StreamExt};
use tracing::{info, warn};

use crate::cache::{CacheStats, CachedValue, DocumentCacheManager};
use crate::config::Config;
use crate::error::{AppError, Result};
use crate::models::{
    ApiResponse, Document, DocumentFilterRequest, DocumentRequest, HealthResponse, Notification,
    NotificationFilterRequest, NotificationRequest, Page, User, UserFilterRequest, UserRequest,
};
use crate::notify::{
    HttpNotificationSink, LocalNotificationSink, NotificationBroadcaster, NotificationGateway,
    NotificationSink,
};
use crate::queue::MessageQueueBroker;
use crate::services::{DocumentService, NotificationIngress, NotificationQueryService, UserService};
use crate::storage::{
    InMemoryDocumentRepository, InMemoryNotificationRepository, InMemoryUserRepository,
    NotificationRepository,
};
use crate::tasks::NotificationIngestor;

// == App State ==
/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub documents: Arc<DocumentService>,
    pub users: Arc<UserService>,
    pub ingress: Arc<NotificationIngress>,
    pub notifications: Arc<NotificationQueryService>,
    pub broadcaster: NotificationBroadcaster,
    pub cache: Arc<DocumentCacheManager>,
    notification_store: Arc<dyn NotificationRepository>,
}

impl AppState {
    /// Creates a new AppState from configuration.
    ///
    /// Document events are delivered over HTTP when a notification service
    /// URL is configured, otherwise straight to the in-process ingress.
    pub fn from_config(config: &Config, broker: Arc<dyn MessageQueueBroker>) -> Result<Self> {
        let ingress = Arc::new(NotificationIngress::new(broker));
        let sink: Arc<dyn NotificationSink> = match &config.notification_service_url {
            Some(url) => {
                info!("Delivering document notifications to {}", url);
                Arc::new(
                    HttpNotificationSink::new(url.clone(), config.notify_timeout())
                        .map_err(|e| AppError::Internal(e.to_string()))?,
                )
            }
            None => Arc::new(LocalNotificationSink::new(ingress.clone())),
        };
        Ok(Self::with_sink(config, ingress, sink))
    }

    /// Wires every service around the given ingress and delivery sink.
    pub fn with_sink(
        config: &Config,
        ingress: Arc<NotificationIngress>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        let users = Arc::new(InMemoryUserRepository::new());
        let notification_store: Arc<dyn NotificationRepository> =
            Arc::new(InMemoryNotificationRepository::new());
        let cache = Arc::new(DocumentCacheManager::new());
        let gateway = NotificationGateway::new(sink, config.notify_timeout());

        Self {
            documents: Arc::new(DocumentService::new(
                Arc::new(InMemoryDocumentRepository::new()),
                users.clone(),
                cache.clone(),
                gateway,
            )),
            users: Arc::new(UserService::new(users)),
            ingress,
            notifications: Arc::new(NotificationQueryService::new(notification_store.clone())),
            broadcaster: NotificationBroadcaster::new(config.broadcast_capacity),
            cache,
            notification_store,
        }
    }

    /// Consumer-side handler that persists into this state's notification
    /// store and feeds this state's broadcaster.
    pub fn ingestor(&self) -> NotificationIngestor {
        NotificationIngestor::new(self.notification_store.clone(), self.broadcaster.clone())
    }
}

// == Users ==
/// Handler for POST /v1/api/users
pub async fn create_user_handler(
    State(state): State<AppState>,
    Json(req): Json<UserRequest>,
) -> Result<Json<ApiResponse<User>>> {
    let user = state.users.create(req).await?;
    Ok(Json(ApiResponse::success(user)))
}

/// Handler for DELETE /v1/api/users/:username
pub async fn delete_user_handler(
    State(state): State<AppState>,
    Path(user_name): Path<String>,
) -> Result<Json<ApiResponse<String>>> {
    state.users.delete(&user_name).await?;
    info!("User deleted successfully with username: {}", user_name);
    Ok(Json(ApiResponse::success(
        "User deleted successfully".to_string(),
    )))
}

/// Handler for POST /v1/api/users/filter
pub async fn filter_users_handler(
    State(state): State<AppState>,
    Json(req): Json<UserFilterRequest>,
) -> Result<Json<ApiResponse<Page<User>>>> {
    let page = state.users.list(&req).await?;
    Ok(Json(ApiResponse::success(page)))
}

// == Documents ==
/// Handler for POST /v1/api/documents
///
/// Succeeds even when the notification could not be sent; the failure is
/// reported in the document's `notificationError`.
pub async fn create_document_handler(
    State(state): State<AppState>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state.documents.create(req).await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Handler for PUT /v1/api/documents/:id
pub async fn update_document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<DocumentRequest>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state.documents.update(&id, req).await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Handler for DELETE /v1/api/documents/:id
pub async fn delete_document_handler(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<String>>> {
    state.documents.delete(&id).await?;
    Ok(Json(ApiResponse::success(
        "Document deleted successfully".to_string(),
    )))
}

/// Handler for GET /v1/api/documents/:key
///
/// The key may be a document id, a document name or an owner username.
pub async fn get_document_handler(
    State(state): State<AppState>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<Document>>> {
    let document = state.documents.get_document(&key).await?;
    Ok(Json(ApiResponse::success(document)))
}

/// Handler for POST /v1/api/documents/filter
pub async fn filter_documents_handler(
    State(state): State<AppState>,
    Json(req): Json<DocumentFilterRequest>,
) -> Result<Json<ApiResponse<Page<Document>>>> {
    let page = state
        .documents
        .query_documents(&req.filter(), req.page, req.size)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

// == Notifications ==
/// Handler for POST /v1/api/notifications
///
/// Returns once the submission is queued; it is persisted asynchronously.
pub async fn submit_notification_handler(
    State(state): State<AppState>,
    Json(req): Json<NotificationRequest>,
) -> Result<Json<ApiResponse<String>>> {
    state.ingress.submit(req)?;
    Ok(Json(ApiResponse::success(
        "Notification received and will be sent successfully".to_string(),
    )))
}

/// Handler for POST /v1/api/notifications/filter
pub async fn filter_notifications_handler(
    State(state): State<AppState>,
    Json(req): Json<NotificationFilterRequest>,
) -> Result<Json<ApiResponse<Page<Notification>>>> {
    let page = state
        .notifications
        .query(&req.filter(), req.page, req.size)
        .await?;
    Ok(Json(ApiResponse::success(page)))
}

/// Handler for GET /v1/api/notifications/stream
///
/// Server-sent events, one `notification` event per persisted notification
/// from the moment of connection on. Nothing is replayed.
pub async fn stream_notifications_handler(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    info!(
        "Live notification subscriber attached ({} total)",
        state.broadcaster.subscriber_count() + 1
    );
    let events = state
        .broadcaster
        .subscribe()
        .into_stream()
        .filter_map(|notification| {
            let event = Event::default().event("notification");
            match event.json_data(&notification) {
                Ok(event) => Some(Ok(event.id(notification.id))),
                Err(err) => {
                    warn!("Could not encode notification {}: {}", notification.id, err);
                    None
                }
            }
        });

    Sse::new(events).keep_alive(KeepAlive::default())
}

// == Cache Inspection ==
#[derive(Debug, Deserialize)]
pub struct CacheKeyQuery {
    pub key: String,
}

fn ensure_cache(state: &AppState, cache_name: &str) -> Result<()> {
    if state.cache.store().has_cache(cache_name) {
        Ok(())
    } else {
        Err(AppError::NotFound(format!("Cache not found: {}", cache_name)))
    }
}

/// Handler for GET /v1/api/cache/inspect/:cache_name
pub async fn inspect_cache_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<ApiResponse<BTreeMap<String, CachedValue>>>> {
    ensure_cache(&state, &cache_name)?;
    let entries: BTreeMap<String, CachedValue> =
        state.cache.store().entries(&cache_name).into_iter().collect();

    if entries.is_empty() {
        info!("Cache {} is empty.", cache_name);
    } else {
        info!("Cache {} contains {} entries.", cache_name, entries.len());
    }
    Ok(Json(ApiResponse::success(entries)))
}

/// Handler for GET /v1/api/cache/contains/:cache_name?key=
pub async fn cache_contains_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
    Query(query): Query<CacheKeyQuery>,
) -> Result<Json<ApiResponse<String>>> {
    ensure_cache(&state, &cache_name)?;
    let message = if state.cache.store().contains_key(&cache_name, &query.key) {
        format!("Key {} is present in cache {}", query.key, cache_name)
    } else {
        format!("Key {} is not present in cache {}", query.key, cache_name)
    };
    Ok(Json(ApiResponse::success(message)))
}

/// Handler for GET /v1/api/cache/size/:cache_name
pub async fn cache_size_handler(
    State(state): State<AppState>,
    Path(cache_name): Path<String>,
) -> Result<Json<ApiResponse<String>>> {
    ensure_cache(&state, &cache_name)?;
    let size = state.cache.store().size(&cache_name);
    Ok(Json(ApiResponse::success(format!(
        "Cache {} contains {} entries.",
        cache_name, size
    ))))
}

/// Handler for GET /v1/api/cache/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
) -> Json<ApiResponse<BTreeMap<String, CacheStats>>> {
    let store = state.cache.store();
    let stats = store
        .cache_names()
        .into_iter()
        .map(|name| {
            let stats = store.stats(&name);
            (name, stats)
        })
        .collect();
    Json(ApiResponse::success(stats))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
