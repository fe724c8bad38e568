//! Layered runtime configuration: `.env`, then an optional TOML file, then
//! environment variables, then command line overrides applied by `main`.

pub mod loader;
pub mod models;
pub mod sources;
pub mod validation;

pub use loader::{ConfigLoad, ConfigLoadError, ConfigLoader, ConfigLoaderOptions};
pub use models::{
    AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
    ProcessorConfig, ServerConfig,
};
pub use validation::{ConfigGuardRailError, ConfigWarning, ConfigWarnings};
