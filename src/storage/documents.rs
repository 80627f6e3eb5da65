//! In-memory document repository.

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{DocumentRepository, StorageResult};
use crate::models::{Document, DocumentFilter, Page, PageRequest};

/// Documents kept in insertion order.
#[derive(Debug, Default)]
pub struct InMemoryDocumentRepository {
    documents: RwLock<Vec<Document>>,
}

impl InMemoryDocumentRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }
}

#[async_trait]
impl DocumentRepository for InMemoryDocumentRepository {
    async fn save(&self, document: Document) -> StorageResult<Document> {
        let mut documents = self.documents.write().await;
        match documents.iter_mut().find(|d| d.id == document.id) {
            Some(existing) => *existing = document.clone(),
            None => documents.push(document.clone()),
        }
        Ok(document)
    }

    async fn find_by_id(&self, id: &str) -> StorageResult<Option<Document>> {
        let documents = self.documents.read().await;
        Ok(documents.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_key(&self, key: &str) -> StorageResult<Option<Document>> {
        let documents = self.documents.read().await;
        let found = documents
            .iter()
            .find(|d| d.id == key)
            .or_else(|| documents.iter().find(|d| d.name == key))
            .or_else(|| documents.iter().rev().find(|d| d.user_name == key));
        Ok(found.cloned())
    }

    async fn find_page(
        &self,
        filter: &DocumentFilter,
        request: PageRequest,
    ) -> StorageResult<Page<Document>> {
        let documents = self.documents.read().await;
        let matching: Vec<Document> = documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        Ok(Page::from_items(matching, request))
    }

    async fn delete_by_id(&self, id: &str) -> StorageResult<bool> {
        let mut documents = self.documents.write().await;
        let before = documents.len();
        documents.retain(|d| d.id != id);
        Ok(documents.len() < before)
    }
}
