use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct FileConfig {
    #[serde(default)]
    pub server: FileServerConfig,
    #[serde(default)]
    pub database: FileDatabaseConfig,
    #[serde(default)]
    pub cors: FileCorsConfig,
    #[serde(default)]
    pub auth: FileAuthConfig,
    #[serde(default)]
    pub processor: FileProcessorConfig,
    pub dev_mode: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileServerConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileDatabaseConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_connections: Option<u32>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileCorsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_origins: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_credentials: Option<bool>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileAuthConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_pepper: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_ttl_hours: Option<i64>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
pub struct FileProcessorConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub simulated_delay_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_dispatch: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sweep_interval_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_after_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trigger_key: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone)]
pub struct EnvConfig {
    pub server_host: Option<String>,
    pub server_port: Option<u16>,
    pub database_url: Option<String>,
    pub database_max_connections: Option<u32>,
    pub cors_allowed_origins: Option<Vec<String>>,
    pub cors_allow_credentials: Option<bool>,
    pub auth_password_pepper: Option<String>,
    pub auth_token_key: Option<String>,
    pub auth_session_ttl_hours: Option<i64>,
    pub scan_simulated_delay_ms: Option<u64>,
    pub scan_auto_dispatch: Option<bool>,
    pub scan_sweep_interval_secs: Option<u64>,
    pub scan_stale_after_secs: Option<u64>,
    pub scan_trigger_key: Option<String>,
    pub dev_mode: Option<bool>,
    pub config_path: Option<PathBuf>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        let mut env_config = Self::default();

        env_config.server_host = std::env::var("SERVER_HOST").ok();
        env_config.server_port = parse_var("SERVER_PORT");
        env_config.database_url = std::env::var("DATABASE_URL").ok();
        env_config.database_max_connections = parse_var("DB_MAX_CONNECTIONS");

        env_config.cors_allowed_origins = parse_csv_var("CORS_ALLOWED_ORIGINS");
        env_config.cors_allow_credentials =
            parse_bool_var("CORS_ALLOW_CREDENTIALS");

        env_config.auth_password_pepper =
            std::env::var("AUTH_PASSWORD_PEPPER").ok();
        env_config.auth_token_key = std::env::var("AUTH_TOKEN_KEY").ok();
        env_config.auth_session_ttl_hours = parse_var("AUTH_SESSION_TTL_HOURS");

        env_config.scan_simulated_delay_ms = parse_var("SCAN_SIMULATED_DELAY_MS");
        env_config.scan_auto_dispatch = parse_bool_var("SCAN_AUTO_DISPATCH");
        env_config.scan_sweep_interval_secs =
            parse_var("SCAN_SWEEP_INTERVAL_SECS");
        env_config.scan_stale_after_secs = parse_var("SCAN_STALE_AFTER_SECS");
        env_config.scan_trigger_key = std::env::var("SCAN_TRIGGER_KEY")
            .ok()
            .filter(|value| !value.trim().is_empty());

        env_config.dev_mode = parse_bool_var("DEV_MODE");
        env_config.config_path =
            std::env::var("SECVO_CONFIG_PATH").ok().map(PathBuf::from);

        env_config
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok().and_then(|s| s.trim().parse().ok())
}

fn parse_csv_var(name: &str) -> Option<Vec<String>> {
    std::env::var(name).ok().map(|raw| {
        raw.split(',')
            .filter_map(|part| {
                let trimmed = part.trim();
                if trimmed.is_empty() {
                    None
                } else {
                    Some(trimmed.to_string())
                }
            })
            .collect()
    })
}

fn parse_bool_var(name: &str) -> Option<bool> {
    std::env::var(name).ok().and_then(|raw| parse_bool(&raw))
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
