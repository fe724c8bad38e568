use std::{fmt, time::Duration};

use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing::info;

use crate::{
    database::repositories::{
        scans::PostgresScanRepository, sessions::PostgresSessionRepository,
        users::PostgresUserRepository,
    },
    error::{CoreError, Result},
};

const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Embedded schema migrations from `secvo-core/migrations`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

/// Statistics about the connection pool
#[derive(Debug, Clone)]
pub struct PoolStats {
    pub size: u32,
    pub idle: u32,
    pub max_size: u32,
}

#[derive(Clone)]
pub struct PostgresDatabase {
    pool: PgPool,
    max_connections: u32,
    scans: PostgresScanRepository,
    users: PostgresUserRepository,
    sessions: PostgresSessionRepository,
}

impl fmt::Debug for PostgresDatabase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresDatabase")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

impl PostgresDatabase {
    pub async fn new(
        connection_string: &str,
        max_connections: Option<u32>,
    ) -> Result<Self> {
        let max_connections =
            max_connections.unwrap_or(DEFAULT_MAX_CONNECTIONS).max(1);

        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(30))
            .max_lifetime(Duration::from_secs(1800))
            .idle_timeout(Duration::from_secs(600))
            .test_before_acquire(true)
            .connect(connection_string)
            .await
            .map_err(|e| {
                CoreError::Internal(format!("Database connection failed: {e}"))
            })?;

        info!(
            "Database pool initialized with max_connections={}",
            max_connections
        );

        Ok(Self::with_pool(pool, max_connections))
    }

    /// Wrap an existing pool, e.g. the per-test database handed out by
    /// `#[sqlx::test]`.
    pub fn from_pool(pool: PgPool) -> Self {
        let max_connections = pool.options().get_max_connections();
        Self::with_pool(pool, max_connections)
    }

    fn with_pool(pool: PgPool, max_connections: u32) -> Self {
        Self {
            scans: PostgresScanRepository::new(pool.clone()),
            users: PostgresUserRepository::new(pool.clone()),
            sessions: PostgresSessionRepository::new(pool.clone()),
            pool,
            max_connections,
        }
    }

    pub fn scans(&self) -> PostgresScanRepository {
        self.scans.clone()
    }

    pub fn users(&self) -> PostgresUserRepository {
        self.users.clone()
    }

    pub fn sessions(&self) -> PostgresSessionRepository {
        self.sessions.clone()
    }

    /// Apply pending migrations from [`MIGRATOR`].
    pub async fn initialize_schema(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    pub fn pool_stats(&self) -> PoolStats {
        PoolStats {
            size: self.pool.size(),
            idle: self.pool.num_idle() as u32,
            max_size: self.max_connections,
        }
    }
}
