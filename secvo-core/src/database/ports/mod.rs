//! Repository ports consumed by the scan and auth services.
//!
//! Implementations live in `database::repositories` (PostgreSQL) and
//! `database::memory` (single-process, used by tests and dev mode).

pub mod scans;
pub mod sessions;
pub mod users;

pub use scans::{CompletionOutcome, ScanRepository};
pub use sessions::{NewSession, SessionRecord, SessionRepository};
pub use users::{NewUser, UserRecord, UserRepository};
