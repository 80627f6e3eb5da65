//! Storage Module
//!
//! Repository contracts for documents, users and notifications, with the
//! in-memory implementations the server runs on.

mod documents;
mod notifications;
mod users;

use std::result;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::models::{
    Document, DocumentFilter, Notification, NotificationDraft, NotificationFilter, Page,
    PageRequest, User,
};

pub use documents::InMemoryDocumentRepository;
pub use notifications::InMemoryNotificationRepository;
pub use users::InMemoryUserRepository;

pub type StorageResult<T> = result::Result<T, StorageError>;

/// Document persistence.
#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts or replaces the document with the same id.
    async fn save(&self, document: Document) -> StorageResult<Document>;

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Document>>;

    /// Resolves a lookup key the way the document cache does: id first,
    /// then document name, then the owner's most recent document.
    async fn find_by_key(&self, key: &str) -> StorageResult<Option<Document>>;

    async fn find_page(
        &self,
        filter: &DocumentFilter,
        request: PageRequest,
    ) -> StorageResult<Page<Document>>;

    /// Returns true if a document was removed.
    async fn delete_by_id(&self, id: &str) -> StorageResult<bool>;
}

/// User persistence. Stamps created/modified timestamps.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `StorageError::Duplicate` if the username is taken.
    async fn insert(&self, user: User) -> StorageResult<User>;

    async fn find_by_id(&self, user_name: &str) -> StorageResult<Option<User>>;

    async fn delete_by_id(&self, user_name: &str) -> StorageResult<bool>;

    /// Case-insensitive username substring match; `None` matches everyone.
    async fn find_page(
        &self,
        user_name: Option<&str>,
        request: PageRequest,
    ) -> StorageResult<Page<User>>;
}

/// Notification persistence. Records are append-only.
#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Persists a draft and assigns its identifier.
    async fn insert(&self, draft: NotificationDraft) -> StorageResult<Notification>;

    /// Matching notifications in persistence order.
    async fn find_page(
        &self,
        filter: &NotificationFilter,
        request: PageRequest,
    ) -> StorageResult<Page<Notification>>;
}
