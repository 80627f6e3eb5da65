//! Document Cache Manager
//!
//! Keeps the two document caches consistent with the document store:
//! the multi-key document cache is point-updated on every write, the
//! filtered-query cache is wiped on every mutation.

use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheStore, DOCUMENTS_CACHE, FILTERED_DOCUMENTS_CACHE};
use crate::models::{Document, DocumentFilter, Page, PageRequest};

// == Cached Value ==
/// Value held by the document caches.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CachedValue {
    Document(Document),
    Page(Page<Document>),
}

/// Cache version observed before a lookup fell through to the store.
///
/// A value loaded from the store is cached only if the cache has not been
/// written since, so a slow read can never overwrite a newer mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheTicket(u64);

// == Document Cache Manager ==
#[derive(Debug)]
pub struct DocumentCacheManager {
    store: CacheStore<CachedValue>,
}

impl DocumentCacheManager {
    pub fn new() -> Self {
        Self {
            store: CacheStore::new([DOCUMENTS_CACHE, FILTERED_DOCUMENTS_CACHE]),
        }
    }

    /// Underlying store, for inspection.
    pub fn store(&self) -> &CacheStore<CachedValue> {
        &self.store
    }

    // == Write Path ==
    /// Records a freshly saved document.
    ///
    /// `previous` is the stored version before an update, if any. Its name
    /// and owner keys are dropped when they changed and still point at this
    /// document. All document keys change in one atomic step.
    pub fn on_document_saved(&self, previous: Option<&Document>, document: &Document) {
        let stale: Vec<&str> = previous
            .map(|prev| {
                [prev.name.as_str(), prev.user_name.as_str()]
                    .into_iter()
                    .filter(|key| *key != document.name && *key != document.user_name)
                    .collect()
            })
            .unwrap_or_default();

        let id = document.id.as_str();
        self.store.replace(
            DOCUMENTS_CACHE,
            stale,
            |cached| matches!(cached, CachedValue::Document(d) if d.id == id),
            [
                document.id.as_str(),
                document.name.as_str(),
                document.user_name.as_str(),
            ],
            CachedValue::Document(document.clone()),
        );

        let evicted = self.store.evict_all(FILTERED_DOCUMENTS_CACHE);
        debug!(
            "Cached document {} under id/name/owner keys, evicted {} filtered pages",
            document.id, evicted
        );
    }

    /// Drops both caches after a delete.
    pub fn on_document_deleted(&self, id: &str) {
        let documents = self.store.evict_all(DOCUMENTS_CACHE);
        let pages = self.store.evict_all(FILTERED_DOCUMENTS_CACHE);
        debug!(
            "Document {} deleted: evicted {} document entries and {} filtered pages",
            id, documents, pages
        );
    }

    // == Read Path ==
    /// Looks up a document by id, name or owner username.
    pub fn get_document(&self, key: &str) -> Option<Document> {
        match self.store.get(DOCUMENTS_CACHE, key) {
            Some(CachedValue::Document(document)) => Some(document),
            _ => None,
        }
    }

    /// Cached page for an exact filter tuple.
    pub fn cached_page(&self, filter: &DocumentFilter, request: PageRequest) -> Option<Page<Document>> {
        let key = filter.cache_key(request.page, request.size);
        match self.store.get(FILTERED_DOCUMENTS_CACHE, &key) {
            Some(CachedValue::Page(page)) => Some(page),
            _ => None,
        }
    }

    /// Taken before loading a document from the store after a miss.
    pub fn document_ticket(&self) -> CacheTicket {
        CacheTicket(self.store.version(DOCUMENTS_CACHE))
    }

    /// Caches a document loaded after a miss under whichever of its id,
    /// name and owner keys are vacant. Leaves the filtered-query cache alone.
    pub fn remember_document(&self, document: &Document, ticket: CacheTicket) -> bool {
        let stored = self.store.fill_if_version(
            DOCUMENTS_CACHE,
            [
                document.id.as_str(),
                document.name.as_str(),
                document.user_name.as_str(),
            ],
            CachedValue::Document(document.clone()),
            ticket.0,
        );
        if !stored {
            debug!("Discarded document {} loaded before a concurrent write", document.id);
        }
        stored
    }

    /// Taken before querying the store for a page that will be cached.
    pub fn page_ticket(&self) -> CacheTicket {
        CacheTicket(self.store.version(FILTERED_DOCUMENTS_CACHE))
    }

    /// Caches a page unless the filtered cache was written after `ticket`.
    pub fn store_page(
        &self,
        filter: &DocumentFilter,
        request: PageRequest,
        page: Page<Document>,
        ticket: CacheTicket,
    ) -> bool {
        let key = filter.cache_key(request.page, request.size);
        let stored = self.store.fill_if_version(
            FILTERED_DOCUMENTS_CACHE,
            [key],
            CachedValue::Page(page),
            ticket.0,
        );
        if !stored {
            debug!("Discarded filtered page computed before a concurrent mutation");
        }
        stored
    }
}

impl Default for DocumentCacheManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DocumentType;
    use chrono::NaiveDate;

    fn document(id: &str, name: &str, owner: &str) -> Document {
        Document {
            id: id.to_string(),
            name: name.to_string(),
            document_type: DocumentType::LegalDocument,
            user_name: owner.to_string(),
            file_url: "https://files.example.com/doc.pdf".to_string(),
            expiry_date: NaiveDate::from_ymd_opt(2031, 6, 1).unwrap(),
            verified: true,
            notification_error: None,
        }
    }

    fn all_filter() -> DocumentFilter {
        DocumentFilter {
            document_type: None,
            user_name: None,
            verified: None,
            notification_failed: None,
        }
    }

    fn cache_page(manager: &DocumentCacheManager) -> PageRequest {
        let request = PageRequest::new(0, 10).unwrap();
        let ticket = manager.page_ticket();
        let page = Page::from_items(vec![document("d0", "x_doc", "x")], request);
        assert!(manager.store_page(&all_filter(), request, page, ticket));
        request
    }

    #[test]
    fn test_saved_document_reachable_by_all_keys() {
        let manager = DocumentCacheManager::new();
        let doc = document("d1", "alice_passport", "alice");
        manager.on_document_saved(None, &doc);

        for key in ["d1", "alice_passport", "alice"] {
            assert_eq!(manager.get_document(key), Some(doc.clone()));
        }
        assert_eq!(manager.store().size(DOCUMENTS_CACHE), 3);
    }

    #[test]
    fn test_save_evicts_filtered_pages() {
        let manager = DocumentCacheManager::new();
        let request = cache_page(&manager);
        assert!(manager.cached_page(&all_filter(), request).is_some());

        manager.on_document_saved(None, &document("d1", "alice_passport", "alice"));
        assert!(manager.cached_page(&all_filter(), request).is_none());
    }

    #[test]
    fn test_rename_drops_old_name_key() {
        let manager = DocumentCacheManager::new();
        let before = document("d1", "alice_passport", "alice");
        manager.on_document_saved(None, &before);

        let after = document("d1", "alice_visa", "alice");
        manager.on_document_saved(Some(&before), &after);

        assert!(manager.get_document("alice_passport").is_none());
        assert_eq!(manager.get_document("alice_visa"), Some(after.clone()));
        assert_eq!(manager.get_document("d1"), Some(after));
    }

    #[test]
    fn test_update_keeps_owner_key_of_newer_document() {
        let manager = DocumentCacheManager::new();
        let first = document("d1", "alice_passport", "alice");
        let second = document("d2", "alice_lease", "alice");
        manager.on_document_saved(None, &first);
        manager.on_document_saved(None, &second);

        // d1 moves to bob; alice's owner key points at d2 and must survive
        let moved = document("d1", "bob_passport", "bob");
        manager.on_document_saved(Some(&first), &moved);

        assert_eq!(manager.get_document("alice"), Some(second));
        assert_eq!(manager.get_document("bob"), Some(moved));
    }

    #[test]
    fn test_delete_evicts_everything() {
        let manager = DocumentCacheManager::new();
        manager.on_document_saved(None, &document("d1", "alice_passport", "alice"));
        manager.on_document_saved(None, &document("d2", "bob_lease", "bob"));
        let request = cache_page(&manager);

        manager.on_document_deleted("d1");

        assert_eq!(manager.store().size(DOCUMENTS_CACHE), 0);
        assert!(manager.get_document("d2").is_none());
        assert!(manager.cached_page(&all_filter(), request).is_none());
    }

    #[test]
    fn test_stale_page_not_stored_after_mutation() {
        let manager = DocumentCacheManager::new();
        let request = PageRequest::new(0, 10).unwrap();
        let ticket = manager.page_ticket();

        // a mutation lands while the query is in flight
        manager.on_document_saved(None, &document("d1", "alice_passport", "alice"));

        let stale = Page::from_items(Vec::new(), request);
        assert!(!manager.store_page(&all_filter(), request, stale, ticket));
        assert!(manager.cached_page(&all_filter(), request).is_none());
    }

    #[test]
    fn test_remember_document_skips_after_concurrent_write() {
        let manager = DocumentCacheManager::new();
        let old = document("d1", "alice_passport", "alice");
        let ticket = manager.document_ticket();

        let new = document("d1", "alice_visa", "alice");
        manager.on_document_saved(Some(&old), &new);

        assert!(!manager.remember_document(&old, ticket));
        assert_eq!(manager.get_document("alice"), Some(new));
        assert!(manager.get_document("alice_passport").is_none());
    }

    #[test]
    fn test_remember_document_keeps_filtered_pages() {
        let manager = DocumentCacheManager::new();
        let request = cache_page(&manager);

        let ticket = manager.document_ticket();
        assert!(manager.remember_document(&document("d1", "alice_passport", "alice"), ticket));

        assert!(manager.get_document("alice_passport").is_some());
        assert!(manager.cached_page(&all_filter(), request).is_some());
    }

    #[test]
    fn test_remember_document_does_not_steal_owner_key() {
        let manager = DocumentCacheManager::new();
        let newest = document("d2", "alice_lease", "alice");
        manager.on_document_saved(None, &newest);

        let ticket = manager.document_ticket();
        let older = document("d1", "alice_passport", "alice");
        assert!(manager.remember_document(&older, ticket));

        assert_eq!(manager.get_document("d1"), Some(older));
        assert_eq!(manager.get_document("alice"), Some(newest));
    }

    #[test]
    fn test_cached_value_serializes_untagged() {
        let json = serde_json::to_value(CachedValue::Document(document("d1", "a_doc", "a"))).unwrap();
        assert_eq!(json["id"], "d1");
    }
}
