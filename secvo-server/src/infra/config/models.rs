use std::{path::PathBuf, time::Duration};

pub const DEFAULT_PASSWORD_PEPPER: &str = "change-me-password-pepper";
pub const DEFAULT_TOKEN_KEY: &str = "change-me-token-key";

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub auth: AuthConfig,
    pub processor: ProcessorConfig,
    pub dev_mode: bool,
    pub metadata: ConfigMetadata,
}

impl Config {
    /// Whether the process should fall back to the in-memory store.
    pub fn uses_memory_store(&self) -> bool {
        self.database.url.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: Option<u32>,
}

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allow_credentials: bool,
}

impl CorsConfig {
    pub fn is_wildcard_included(&self) -> bool {
        self.allowed_origins
            .iter()
            .any(|origin| origin.trim() == "*")
    }
}

#[derive(Clone)]
pub struct AuthConfig {
    pub password_pepper: String,
    pub token_key: String,
    pub session_ttl_hours: i64,
}

impl AuthConfig {
    pub fn is_default_pepper(&self) -> bool {
        self.password_pepper == DEFAULT_PASSWORD_PEPPER
    }

    pub fn is_default_token_key(&self) -> bool {
        self.token_key == DEFAULT_TOKEN_KEY
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("password_pepper", &"<redacted>")
            .field("token_key", &"<redacted>")
            .field("session_ttl_hours", &self.session_ttl_hours)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct ProcessorConfig {
    pub simulated_delay_ms: u64,
    /// Spawn processing right after intake instead of waiting for the
    /// trigger endpoint.
    pub auto_dispatch: bool,
    /// `0` disables the recovery sweep.
    pub sweep_interval_secs: u64,
    pub stale_after_secs: u64,
    pub trigger_key: Option<String>,
}

impl ProcessorConfig {
    pub fn simulated_delay(&self) -> Duration {
        Duration::from_millis(self.simulated_delay_ms)
    }

    pub fn sweep_interval(&self) -> Option<Duration> {
        (self.sweep_interval_secs > 0)
            .then(|| Duration::from_secs(self.sweep_interval_secs))
    }

    pub fn stale_after(&self) -> chrono::Duration {
        let secs = self.stale_after_secs.min(u64::from(u32::MAX));
        chrono::Duration::seconds(secs as i64)
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}
