use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::{UserId, UserProfile};

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

impl UserRecord {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            email: self.email.clone(),
            created_at: self.created_at,
        }
    }
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new account. Fails with `CoreError::Conflict` when the email
    /// is already registered (compared case-insensitively).
    async fn create_user(&self, user: NewUser) -> Result<UserRecord>;

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>>;

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>>;
}
