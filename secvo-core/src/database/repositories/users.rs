use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secvo_model::UserId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::ports::users::{NewUser, UserRecord, UserRepository};
use crate::error::{CoreError, Result};

#[derive(Debug, Clone)]
pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn pool(&self) -> &PgPool {
        &self.pool
    }

    fn map_row(row: UserRow) -> UserRecord {
        UserRecord {
            id: UserId(row.id),
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn create_user(&self, user: NewUser) -> Result<UserRecord> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, email, password_hash, created_at)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::now_v7())
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(Utc::now())
        .fetch_one(self.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                CoreError::Conflict(format!(
                    "Email {} is already registered",
                    user.email
                ))
            }
            other => {
                CoreError::Internal(format!("Failed to create user: {other}"))
            }
        })?;

        Ok(Self::map_row(row))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, email, password_hash, created_at
            FROM users
            WHERE LOWER(email) = LOWER($1)
            "#,
        )
        .bind(email)
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Self::map_row))
    }

    async fn get_user(&self, id: UserId) -> Result<Option<UserRecord>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id.to_uuid())
        .fetch_optional(self.pool())
        .await?;

        Ok(row.map(Self::map_row))
    }
}
