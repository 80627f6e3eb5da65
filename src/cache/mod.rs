//! Cache Module
//!
//! Named, keyed in-memory caches and the document cache policy built on them.

mod manager;
mod stats;
mod store;


// Re-export public types
pub use manager::{CacheTicket, CachedValue, DocumentCacheManager};
pub use stats::CacheStats;
pub use store::CacheStore;

// == Cache Names ==
/// Per-document multi-key cache (id, name and owner username keys)
pub const DOCUMENTS_CACHE: &str = "documentsCache";

/// Filtered-query result cache keyed by the full filter tuple
pub const FILTERED_DOCUMENTS_CACHE: &str = "filteredDocumentsCache";
