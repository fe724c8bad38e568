//! Core library for the Secvo scan service.
//!
//! Holds the storage ports and their adapters (PostgreSQL and in-memory), the
//! scan lifecycle services (intake, processor, dispatcher, viewer) and the
//! account/session machinery the HTTP layer builds on.

pub mod database;
pub mod domain;
pub mod error;

pub use database::{
    context::{StoreBackend, StoreContext},
    memory::InMemoryStore,
    ports::{
        CompletionOutcome, NewSession, NewUser, ScanRepository,
        SessionRecord, SessionRepository, UserRecord, UserRepository,
    },
    postgres::{MIGRATOR, PoolStats, PostgresDatabase},
};
pub use domain::auth::{AuthCrypto, AuthCryptoError, AuthError, AuthService};
pub use domain::scan::{
    catalog::{CatalogEntry, FINDING_CATALOG},
    dispatch::ScanDispatcher,
    intake::{IntakeError, ScanIntake},
    outcome::{ScanOutcome, draw_outcome, finding_count_range},
    processor::{
        ProcessError, ProcessOutcome, ProcessorSettings, ScanProcessor,
    },
    viewer::{ScanViewer, ViewerError},
};
pub use error::{CoreError, Result};
pub use secvo_model as model;
