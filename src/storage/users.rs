//! In-memory user repository.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::{StorageResult, UserRepository};
use crate::error::StorageError;
use crate::models::{Page, PageRequest, User};

/// Users keyed (and listed) by username.
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: RwLock<BTreeMap<String, User>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, mut user: User) -> StorageResult<User> {
        let mut users = self.users.write().await;
        if users.contains_key(&user.user_name) {
            return Err(StorageError::Duplicate(user.user_name));
        }

        let now = Utc::now();
        user.created_date = Some(now);
        user.last_modified_date = Some(now);
        users.insert(user.user_name.clone(), user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, user_name: &str) -> StorageResult<Option<User>> {
        Ok(self.users.read().await.get(user_name).cloned())
    }

    async fn delete_by_id(&self, user_name: &str) -> StorageResult<bool> {
        Ok(self.users.write().await.remove(user_name).is_some())
    }

    async fn find_page(
        &self,
        user_name: Option<&str>,
        request: PageRequest,
    ) -> StorageResult<Page<User>> {
        let needle = user_name.map(str::to_lowercase);
        let users = self.users.read().await;
        let matching: Vec<User> = users
            .values()
            .filter(|u| {
                needle
                    .as_deref()
                    .map_or(true, |n| u.user_name.to_lowercase().contains(n))
            })
            .cloned()
            .collect();
        Ok(Page::from_items(matching, request))
    }
}
