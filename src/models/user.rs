//! User record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A document owner. The username is the primary key and never changes.
///
/// Timestamps are stamped by the user repository, not by callers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_name: String,
    pub first_name: String,
    pub last_name: String,
    pub created_date: Option<DateTime<Utc>>,
    pub last_modified_date: Option<DateTime<Utc>>,
}
