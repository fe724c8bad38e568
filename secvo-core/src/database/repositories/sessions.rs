use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::sessions::{
    NewSession, SessionRecord, SessionRepository,
};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: SessionRow) -> SessionRecord {
        SessionRecord {
            id: row.id,
            user_id: UserId(row.user_id),
            token_hash: row.token_hash,
            created_at: row.created_at,
            expires_at: row.expires_at,
            revoked_at: row.revoked_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SessionRow {
    id: Uuid,
    user_id: Uuid,
    token_hash: String,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    revoked_at: Option<DateTime<Utc>>,
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create_session(&self, session: NewSession) -> Result<SessionRecord> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            INSERT INTO sessions (id, user_id, token_hash, created_at, expires_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, user_id, token_hash, created_at, expires_at, revoked_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(session.user_id.to_uuid())
        .bind(&session.token_hash)
        .bind(Utc::now())
        .bind(session.expires_at)
        .fetch_one(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to create session: {e}"))
        })?;

        Ok(Self::map_row(row))
    }

    async fn find_active_by_token_hash(
        &self,
        token_hash: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<SessionRecord>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT id, user_id, token_hash, created_at, expires_at, revoked_at
            FROM sessions
            WHERE token_hash = $1
              AND revoked_at IS NULL
              AND expires_at > $2
            "#,
        )
        .bind(token_hash)
        .bind(now)
        .fetch_optional(self.pool())
        .await
        .map_err(|e| {
            CoreError::Internal(format!("Failed to lookup session: {e}"))
        })?;

        Ok(row.map(Self::map_row))
    }

    async fn revoke(&self, id: Uuid, now: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE sessions SET revoked_at = $2 WHERE id = $1 AND revoked_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(self.pool())
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn purge_expired(&self, before: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at < $1")
            .bind(before)
            .execute(self.pool())
            .await?;

        Ok(result.rows_affected())
    }
}
