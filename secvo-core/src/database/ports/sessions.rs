use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::UserId;
use uuid::Uuid;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct NewSession {
    pub user_id: UserId,
    pub token_hash: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SessionRecord {
    pub id: Uuid,
    pub user_id: UserId,
    pub token_hash: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
}

impl SessionRecord {
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        self.revoked_at.is_none() && self.expires_at > now
    }
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord>;

    /// Lookup a session by the stored token hash. Revoked or expired sessions
    /// are ignored.
    async fn find_active_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>>;

    /// Revoke a session. Returns `false` when it was already revoked or does
    /// not exist.
    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool>;

    /// Delete sessions that expired before `before`, returning the number of
    /// rows removed.
    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64>;
}
