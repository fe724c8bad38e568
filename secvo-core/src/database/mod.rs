pub mod context;
pub mod memory;
pub mod ports;
pub mod postgres;
pub mod repositories;

pub use context::{StoreBackend, StoreContext};
pub use memory::InMemoryStore;
pub use postgres::{PoolStats, PostgresDatabase};
