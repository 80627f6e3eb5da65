//! User Service

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{AppError, Result, StorageError};
use crate::models::{Page, PageRequest, User, UserFilterRequest, UserRequest};
use crate::storage::UserRepository;

pub struct UserService {
    users: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }

    /// Creates a user; the username must not be taken.
    pub async fn create(&self, request: UserRequest) -> Result<User> {
        if let Some(message) = request.validate() {
            return Err(AppError::Validation(message));
        }
        info!("Creating a new user: {}", request.user_name);

        let user = User {
            user_name: request.user_name,
            first_name: request.first_name,
            last_name: request.last_name,
            created_date: None,
            last_modified_date: None,
        };

        match self.users.insert(user).await {
            Ok(user) => Ok(user),
            Err(StorageError::Duplicate(name)) => {
                warn!("User already exists with username: {}", name);
                Err(AppError::Conflict(format!(
                    "User already exists with username: {}",
                    name
                )))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Deletes a user. Their documents are left untouched.
    pub async fn delete(&self, user_name: &str) -> Result<()> {
        info!("Deleting user with username: {}", user_name);
        if !self.users.delete_by_id(user_name).await? {
            warn!("User not found with username: {}", user_name);
            return Err(AppError::NotFound(format!(
                "User not found with username: {}",
                user_name
            )));
        }
        Ok(())
    }

    pub async fn list(&self, request: &UserFilterRequest) -> Result<Page<User>> {
        let page = PageRequest::new(request.page, request.size)?;
        info!(
            "Fetching users with filters - username: {:?}",
            request.user_name
        );
        Ok(self
            .users
            .find_page(request.user_name.as_deref(), page)
            .await?)
    }
}
