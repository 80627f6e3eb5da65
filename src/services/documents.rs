//! Document Service
//!
//! Validated document mutations. Each successful mutation updates the
//! document caches and emits one notification; a failed notification is
//! recorded on the document instead of failing the call.

use std::sync::Arc;

use chrono::{Days, NaiveDate, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::cache::DocumentCacheManager;
use crate::error::{AppError, Result};
use crate::models::{Document, DocumentFilter, DocumentRequest, EventType, Page, PageRequest};
use crate::notify::NotificationGateway;
use crate::storage::{DocumentRepository, UserRepository};

/// Minimum distance between today and a document's expiry date.
pub const MIN_EXPIRY_DAYS: u64 = 60;

pub struct DocumentService {
    documents: Arc<dyn DocumentRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<DocumentCacheManager>,
    gateway: NotificationGateway,
}

impl DocumentService {
    pub fn new(
        documents: Arc<dyn DocumentRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<DocumentCacheManager>,
        gateway: NotificationGateway,
    ) -> Self {
        Self {
            documents,
            users,
            cache,
            gateway,
        }
    }

    // == Create ==
    pub async fn create(&self, request: DocumentRequest) -> Result<Document> {
        let mut document = Document {
            id: Uuid::new_v4().to_string(),
            name: required(request.name, "Document name is required")?,
            document_type: required(request.document_type, "Document type is required")?,
            user_name: required(request.user_name, "Username is required")?,
            file_url: required(request.file_url, "File URL is required")?,
            expiry_date: required(request.expiry_date, "Expiry date is required")?,
            verified: false,
            notification_error: None,
        };
        info!(
            "Creating document {} for user {}",
            document.name, document.user_name
        );

        self.validate(&mut document).await?;
        let saved = self.documents.save(document).await?;
        self.cache.on_document_saved(None, &saved);

        Ok(self.notify_or_record(EventType::Create, saved).await)
    }

    // == Update ==
    /// Overlays the present request fields on the stored document and
    /// re-validates the result.
    pub async fn update(&self, id: &str, request: DocumentRequest) -> Result<Document> {
        let existing = self.find_existing(id).await?;
        info!("Updating document with ID: {}", id);

        let mut document = existing.clone();
        if let Some(name) = request.name {
            document.name = name;
        }
        if let Some(document_type) = request.document_type {
            document.document_type = document_type;
        }
        if let Some(user_name) = request.user_name {
            document.user_name = user_name;
        }
        if let Some(file_url) = request.file_url {
            document.file_url = file_url;
        }
        if let Some(expiry_date) = request.expiry_date {
            document.expiry_date = expiry_date;
        }
        document.notification_error = None;

        self.validate(&mut document).await?;
        let saved = self.documents.save(document).await?;
        self.cache.on_document_saved(Some(&existing), &saved);

        Ok(self.notify_or_record(EventType::Update, saved).await)
    }

    // == Delete ==
    /// Removes the document and evicts both caches. The delete
    /// notification is best effort; its failure is only logged.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let document = self.find_existing(id).await?;
        info!("Deleting document with ID: {}", id);

        self.documents.delete_by_id(id).await?;
        self.cache.on_document_deleted(id);

        if let Err(err) = self.gateway.notify(EventType::Delete, &document).await {
            warn!("Delete notification for document {} was not sent: {}", id, err);
        }
        Ok(())
    }

    // == Reads ==
    /// Looks up a document by id, name or owner username, cache first.
    pub async fn get_document(&self, key: &str) -> Result<Document> {
        if let Some(document) = self.cache.get_document(key) {
            return Ok(document);
        }

        let ticket = self.cache.document_ticket();
        match self.documents.find_by_key(key).await? {
            Some(document) => {
                self.cache.remember_document(&document, ticket);
                Ok(document)
            }
            None => Err(AppError::NotFound(format!(
                "Document not found with key: {}",
                key
            ))),
        }
    }

    /// Filtered, paginated query served from the filtered-query cache when
    /// the exact filter tuple was seen since the last mutation.
    pub async fn query_documents(
        &self,
        filter: &DocumentFilter,
        page: i64,
        size: i64,
    ) -> Result<Page<Document>> {
        let request = PageRequest::new(page, size)?;
        if let Some(cached) = self.cache.cached_page(filter, request) {
            return Ok(cached);
        }

        info!(
            "Fetching documents with filters - type: {:?}, user: {:?}, verified: {:?}, notificationFailed: {:?}",
            filter.document_type, filter.user_name, filter.verified, filter.notification_failed
        );
        let ticket = self.cache.page_ticket();
        let result = self.documents.find_page(filter, request).await?;
        self.cache.store_page(filter, request, result.clone(), ticket);
        Ok(result)
    }

    // == Helpers ==
    async fn find_existing(&self, id: &str) -> Result<Document> {
        self.documents.find_by_id(id).await?.ok_or_else(|| {
            warn!("Document not found with ID: {}", id);
            AppError::NotFound(format!("Document not found with ID: {}", id))
        })
    }

    async fn validate(&self, document: &mut Document) -> Result<()> {
        if self.users.find_by_id(&document.user_name).await?.is_none() {
            return Err(AppError::Validation(format!(
                "User not found: {}",
                document.user_name
            )));
        }
        if !document.name.starts_with(&document.user_name) {
            return Err(AppError::Validation(
                "Document name must start with the owner's username.".to_string(),
            ));
        }
        if document.expiry_date < earliest_expiry(Utc::now().date_naive()) {
            return Err(AppError::Validation(format!(
                "Document expiry date must be at least {} days in the future.",
                MIN_EXPIRY_DAYS
            )));
        }

        document.verified = true;
        Ok(())
    }

    /// Sends the event notification. On failure the reason is stored on the
    /// document, which is saved and cached again.
    async fn notify_or_record(&self, event_type: EventType, document: Document) -> Document {
        let err = match self.gateway.notify(event_type, &document).await {
            Ok(()) => return document,
            Err(err) => err,
        };

        let mut failed = document.clone();
        failed.notification_error = Some(format!("Notification failed: {}", err));
        match self.documents.save(failed.clone()).await {
            Ok(saved) => {
                self.cache.on_document_saved(Some(&document), &saved);
                saved
            }
            Err(save_err) => {
                error!(
                    "Could not record notification failure on document {}: {}",
                    document.id, save_err
                );
                failed
            }
        }
    }
}

fn required<T>(value: Option<T>, message: &str) -> Result<T> {
    value.ok_or_else(|| AppError::Validation(message.to_string()))
}

fn earliest_expiry(today: NaiveDate) -> NaiveDate {
    today
        .checked_add_days(Days::new(MIN_EXPIRY_DAYS))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{DOCUMENTS_CACHE, FILTERED_DOCUMENTS_CACHE};
    use crate::error::DeliveryError;
    use crate::models::{DocumentType, User};
    use crate::notify::InMemorySink;
    use crate::storage::{InMemoryDocumentRepository, InMemoryUserRepository};
    use std::time::Duration;

    struct Fixture {
        service: DocumentService,
        documents: Arc<InMemoryDocumentRepository>,
        cache: Arc<DocumentCacheManager>,
        sink: Arc<InMemorySink>,
    }

    async fn fixture() -> Fixture {
        let documents = Arc::new(InMemoryDocumentRepository::new());
        let users = Arc::new(InMemoryUserRepository::new());
        for name in ["alice", "bob", "all"] {
            users
                .insert(User {
                    user_name: name.to_string(),
                    first_name: "First".to_string(),
                    last_name: "Last".to_string(),
                    created_date: None,
                    last_modified_date: None,
                })
                .await
                .unwrap();
        }
        let cache = Arc::new(DocumentCacheManager::new());
        let sink = Arc::new(InMemorySink::new());
        let gateway = NotificationGateway::new(sink.clone(), Duration::from_secs(1));

        Fixture {
            service: DocumentService::new(documents.clone(), users, cache.clone(), gateway),
            documents,
            cache,
            sink,
        }
    }

    fn in_days(days: u64) -> NaiveDate {
        Utc::now()
            .date_naive()
            .checked_add_days(Days::new(days))
            .unwrap()
    }

    fn request(name: &str, owner: &str, expiry: NaiveDate) -> DocumentRequest {
        DocumentRequest {
            name: Some(name.to_string()),
            document_type: Some(DocumentType::IdVerification),
            user_name: Some(owner.to_string()),
            file_url: Some("https://files.example.com/passport.pdf".to_string()),
            expiry_date: Some(expiry),
        }
    }

    #[tokio::test]
    async fn test_create_caches_and_notifies() {
        let fx = fixture().await;
        let doc = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();

        assert!(doc.verified);
        assert!(doc.notification_error.is_none());
        for key in [doc.id.as_str(), "alice_passport", "alice"] {
            assert_eq!(fx.cache.get_document(key), Some(doc.clone()));
        }

        let sent = fx.sink.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].event_type, EventType::Create);
        assert_eq!(
            sent[0].message,
            "alice has added a new document named alice_passport."
        );
    }

    #[tokio::test]
    async fn test_create_rejects_near_expiry_without_side_effects() {
        let fx = fixture().await;
        let err = fx
            .service
            .create(request("alice_passport", "alice", in_days(10)))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(fx.documents.len().await, 0);
        assert_eq!(fx.cache.store().size(DOCUMENTS_CACHE), 0);
        assert!(fx.sink.sent().is_empty());
    }

    #[tokio::test]
    async fn test_expiry_boundary_is_inclusive() {
        let fx = fixture().await;
        assert!(fx
            .service
            .create(request("alice_passport", "alice", in_days(MIN_EXPIRY_DAYS)))
            .await
            .is_ok());
        assert!(fx
            .service
            .create(request("alice_visa", "alice", in_days(MIN_EXPIRY_DAYS - 1)))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_create_validation_messages() {
        let fx = fixture().await;

        let err = fx
            .service
            .create(request("carol_doc", "carol", in_days(90)))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "User not found: carol");

        let err = fx
            .service
            .create(request("passport", "alice", in_days(90)))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Document name must start with the owner's username."
        );

        let mut missing = request("alice_passport", "alice", in_days(90));
        missing.file_url = None;
        let err = fx.service.create(missing).await.unwrap_err();
        assert_eq!(err.to_string(), "File URL is required");
    }

    #[tokio::test]
    async fn test_failed_notification_is_recorded() {
        let fx = fixture().await;
        fx.sink
            .fail_with(Some(DeliveryError::Transport("connection refused".into())));

        let doc = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();

        let error = doc.notification_error.clone().unwrap();
        assert!(error.starts_with("Notification failed: "));
        assert!(error.contains("connection refused"));

        let stored = fx.documents.find_by_id(&doc.id).await.unwrap().unwrap();
        assert_eq!(stored, doc);
        assert_eq!(fx.cache.get_document("alice_passport"), Some(doc));
    }

    #[tokio::test]
    async fn test_update_overlays_and_clears_previous_error() {
        let fx = fixture().await;
        fx.sink
            .fail_with(Some(DeliveryError::Rejected("queue full".into())));
        let created = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();
        assert!(created.notification_error.is_some());

        fx.sink.fail_with(None);
        let update = DocumentRequest {
            name: Some("alice_visa".to_string()),
            ..Default::default()
        };
        let updated = fx.service.update(&created.id, update).await.unwrap();

        assert_eq!(updated.name, "alice_visa");
        assert_eq!(updated.file_url, created.file_url);
        assert!(updated.notification_error.is_none());
        assert!(fx.cache.get_document("alice_passport").is_none());
        assert_eq!(fx.cache.get_document("alice_visa"), Some(updated));
        assert_eq!(fx.sink.sent()[0].event_type, EventType::Update);
    }

    #[tokio::test]
    async fn test_update_revalidates_merged_document() {
        let fx = fixture().await;
        let created = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();

        // owner moves to bob but the name still carries alice's prefix
        let update = DocumentRequest {
            user_name: Some("bob".to_string()),
            ..Default::default()
        };
        let err = fx.service.update(&created.id, update).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let stored = fx.documents.find_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(stored.user_name, "alice");
    }

    #[tokio::test]
    async fn test_update_missing_document() {
        let fx = fixture().await;
        let err = fx
            .service
            .update("nope", DocumentRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Document not found with ID: nope");
    }

    #[tokio::test]
    async fn test_delete_evicts_caches_and_ignores_notify_failure() {
        let fx = fixture().await;
        let doc = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();
        fx.service
            .query_documents(&DocumentFilter::default(), 0, 10)
            .await
            .unwrap();

        fx.sink
            .fail_with(Some(DeliveryError::Transport("down".into())));
        fx.service.delete(&doc.id).await.unwrap();

        assert_eq!(fx.documents.len().await, 0);
        assert_eq!(fx.cache.store().size(DOCUMENTS_CACHE), 0);
        assert_eq!(fx.cache.store().size(FILTERED_DOCUMENTS_CACHE), 0);
        assert!(matches!(
            fx.service.delete(&doc.id).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_get_document_falls_back_to_store() {
        let fx = fixture().await;
        let doc = fx
            .service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();
        fx.cache.store().evict_all(DOCUMENTS_CACHE);

        assert_eq!(fx.service.get_document("alice").await.unwrap(), doc);
        assert_eq!(fx.cache.get_document(&doc.id), Some(doc.clone()));
        assert!(matches!(
            fx.service.get_document("ghost").await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_query_documents_is_cached_until_next_mutation() {
        let fx = fixture().await;
        fx.service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();

        let filter = DocumentFilter {
            user_name: Some("alice".to_string()),
            ..Default::default()
        };
        let first = fx.service.query_documents(&filter, 0, 10).await.unwrap();
        assert_eq!(first.total_elements, 1);
        assert_eq!(fx.cache.store().size(FILTERED_DOCUMENTS_CACHE), 1);

        fx.service
            .create(request("alice_lease", "alice", in_days(120)))
            .await
            .unwrap();
        assert_eq!(fx.cache.store().size(FILTERED_DOCUMENTS_CACHE), 0);

        let second = fx.service.query_documents(&filter, 0, 10).await.unwrap();
        assert_eq!(second.total_elements, 2);
    }

    #[tokio::test]
    async fn test_owner_named_all_does_not_share_unfiltered_page() {
        let fx = fixture().await;
        fx.service
            .create(request("alice_passport", "alice", in_days(90)))
            .await
            .unwrap();
        fx.service
            .create(request("all_lease", "all", in_days(90)))
            .await
            .unwrap();

        let everyone = fx
            .service
            .query_documents(&DocumentFilter::default(), 0, 10)
            .await
            .unwrap();
        assert_eq!(everyone.total_elements, 2);

        let filter = DocumentFilter {
            user_name: Some("all".to_string()),
            ..Default::default()
        };
        let only_all = fx.service.query_documents(&filter, 0, 10).await.unwrap();
        assert_eq!(only_all.total_elements, 1);
        assert_eq!(only_all.content[0].user_name, "all");
        assert_eq!(fx.cache.store().size(FILTERED_DOCUMENTS_CACHE), 2);
    }

    #[test]
    fn test_earliest_expiry() {
        let today = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
        assert_eq!(
            earliest_expiry(today),
            NaiveDate::from_ymd_opt(2026, 3, 2).unwrap()
        );
    }
}
