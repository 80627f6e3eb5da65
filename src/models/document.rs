//! Document record and the filter tuple used by the filtered-query cache.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// == Document Type ==
/// Closed set of document categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DocumentType {
    FinancialDocument,
    IdVerification,
    LegalDocument,
    Other,
}

impl DocumentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentType::FinancialDocument => "FINANCIAL_DOCUMENT",
            DocumentType::IdVerification => "ID_VERIFICATION",
            DocumentType::LegalDocument => "LEGAL_DOCUMENT",
            DocumentType::Other => "OTHER",
        }
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Document ==
/// A stored document owned by a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub id: String,
    pub name: String,
    pub document_type: DocumentType,
    pub user_name: String,
    pub file_url: String,
    pub expiry_date: NaiveDate,
    /// Computed by validation, never taken from the client
    pub verified: bool,
    /// Set only when the synchronous notification attempt failed
    pub notification_error: Option<String>,
}

// == Document Filter ==
/// Filter tuple for paginated document queries.
///
/// Every field takes part in the filtered-query cache key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct DocumentFilter {
    pub document_type: Option<DocumentType>,
    pub user_name: Option<String>,
    pub verified: Option<bool>,
    /// `Some(true)` keeps only documents whose notification failed
    pub notification_failed: Option<bool>,
}

impl DocumentFilter {
    /// Returns true if the document passes every present filter.
    pub fn matches(&self, document: &Document) -> bool {
        self.document_type
            .map_or(true, |t| t == document.document_type)
            && self
                .user_name
                .as_deref()
                .map_or(true, |u| u == document.user_name)
            && self.verified.map_or(true, |v| v == document.verified)
            && (self.notification_failed != Some(true) || document.notification_error.is_some())
    }

    /// Cache key for this filter combined with a page position.
    ///
    /// An absent field renders as `-` and a present one as `=` followed by
    /// its `Debug` form, which quotes and escapes strings. No user name can
    /// stand in for an unset field or spill into the next one.
    pub fn cache_key(&self, page: usize, size: usize) -> String {
        fn part<T: fmt::Debug>(value: Option<T>) -> String {
            value.map_or_else(|| "-".to_string(), |v| format!("={v:?}"))
        }

        format!(
            "{}:{}:{}:{}:{}:{}",
            part(self.document_type),
            part(self.user_name.as_deref()),
            part(self.verified),
            part(self.notification_failed),
            page,
            size
        )
    }
}
