pub mod scans;
pub mod sessions;
pub mod users;

pub use scans::PostgresScanRepository;
pub use sessions::PostgresSessionRepository;
pub use users::PostgresUserRepository;
