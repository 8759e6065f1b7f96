//! Users repository

use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::user::User,
};

use super::store::KeyValueStore;

pub const USERS_KEY: &str = "users";

#[derive(Clone)]
pub struct UsersRepository {
    store: Arc<dyn KeyValueStore>,
}

impl UsersRepository {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// Stored user list, `None` when absent or unreadable
    pub async fn load(&self) -> AppResult<Option<Vec<User>>> {
        let Some(raw) = self.store.get(USERS_KEY).await? else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<User>>(&raw) {
            Ok(users) => Ok(Some(users)),
            Err(e) => {
                tracing::warn!("Ignoring unreadable users record: {}", e);
                Ok(None)
            }
        }
    }

    /// Overwrite the stored user list
    pub async fn save(&self, users: &[User]) -> AppResult<()> {
        let payload = serde_json::to_string(users)
            .map_err(|e| AppError::Internal(format!("Failed to serialize users: {}", e)))?;
        self.store.set(USERS_KEY, &payload).await
    }

    /// Get user by username
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .load()
            .await?
            .unwrap_or_default()
            .into_iter()
            .find(|u| u.username == username))
    }
}
