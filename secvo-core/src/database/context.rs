use std::fmt;
use std::sync::Arc;

use crate::database::{
    memory::InMemoryStore,
    ports::{ScanRepository, SessionRepository, UserRepository},
    postgres::{PoolStats, PostgresDatabase},
};
use crate::error::Result;

/// Which adapter a [`StoreContext`] was composed from.
#[derive(Clone, Debug)]
pub enum StoreBackend {
    Postgres(Arc<PostgresDatabase>),
    Memory(InMemoryStore),
}

/// Bundles the repository ports the services need, regardless of which
/// adapter provides them.
#[derive(Clone)]
pub struct StoreContext {
    backend: StoreBackend,
    scans: Arc<dyn ScanRepository>,
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl fmt::Debug for StoreContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreContext")
            .field("backend", &self.backend_name())
            .field("scans_ptr", &Arc::as_ptr(&self.scans))
            .finish_non_exhaustive()
    }
}

impl StoreContext {
    /// Establish a PostgreSQL connection and compose the default repositories.
    pub async fn connect_postgres(
        connection_string: &str,
        max_connections: Option<u32>,
    ) -> Result<Self> {
        let postgres = Arc::new(
            PostgresDatabase::new(connection_string, max_connections).await?,
        );
        Ok(Self::from_postgres(postgres))
    }

    pub fn from_postgres(postgres: Arc<PostgresDatabase>) -> Self {
        Self {
            scans: Arc::new(postgres.scans()),
            users: Arc::new(postgres.users()),
            sessions: Arc::new(postgres.sessions()),
            backend: StoreBackend::Postgres(postgres),
        }
    }

    pub fn in_memory() -> Self {
        Self::from_memory(InMemoryStore::new())
    }

    pub fn from_memory(store: InMemoryStore) -> Self {
        Self {
            scans: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            sessions: Arc::new(store.clone()),
            backend: StoreBackend::Memory(store),
        }
    }

    /// Connection pool statistics; `None` for the in-memory store.
    pub fn pool_stats(&self) -> Option<PoolStats> {
        match &self.backend {
            StoreBackend::Postgres(postgres) => Some(postgres.pool_stats()),
            StoreBackend::Memory(_) => None,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        match self.backend {
            StoreBackend::Postgres(_) => "postgres",
            StoreBackend::Memory(_) => "memory",
        }
    }

    pub fn scans(&self) -> Arc<dyn ScanRepository> {
        Arc::clone(&self.scans)
    }

    pub fn users(&self) -> Arc<dyn UserRepository> {
        Arc::clone(&self.users)
    }

    pub fn sessions(&self) -> Arc<dyn SessionRepository> {
        Arc::clone(&self.sessions)
    }

    /// Apply migrations when backed by PostgreSQL. The in-memory store has no
    /// schema.
    pub async fn initialize_schema(&self) -> Result<()> {
        match &self.backend {
            StoreBackend::Postgres(postgres) => postgres.initialize_schema().await,
            StoreBackend::Memory(_) => Ok(()),
        }
    }
}
