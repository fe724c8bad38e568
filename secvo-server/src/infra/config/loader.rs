use once_cell::sync::Lazy;
use std::{fs, path::PathBuf};
use thiserror::Error;

use super::{
    models::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DEFAULT_PASSWORD_PEPPER,
        DEFAULT_TOKEN_KEY, DatabaseConfig, ProcessorConfig, ServerConfig,
    },
    sources::{EnvConfig, FileConfig},
    validation::{self, ConfigGuardRailError, ConfigWarnings},
};

static DEFAULT_CONFIG_LOCATIONS: Lazy<Vec<PathBuf>> = Lazy::new(|| {
    vec![
        PathBuf::from("secvo.toml"),
        PathBuf::from("config/secvo.toml"),
    ]
});

const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const DEFAULT_SIMULATED_DELAY_MS: u64 = 3_000;
const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 60;
const DEFAULT_STALE_AFTER_SECS: u64 = 120;

#[derive(Debug, Default, Clone)]
pub struct ConfigLoaderOptions {
    pub config_path: Option<PathBuf>,
    pub env_file: Option<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ConfigLoader {
    options: ConfigLoaderOptions,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: ConfigLoaderOptions) -> Self {
        Self { options }
    }

    pub fn with_config_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.config_path = Some(path.into());
        self
    }

    pub fn with_env_file<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.options.env_file = Some(path.into());
        self
    }

    /// Load `.env`, read the process environment and compose the final
    /// configuration.
    pub fn load(&self) -> Result<ConfigLoad, ConfigLoadError> {
        let env_file_loaded = match &self.options.env_file {
            Some(path) => dotenvy::from_path(path).map(|_| true).or_else(
                |err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                },
            )?,
            None => {
                dotenvy::dotenv().map(|_| true).or_else(|err| match err {
                    dotenvy::Error::Io(_) => Ok(false),
                    _ => Err(err),
                })?
            }
        };

        self.load_with_env(EnvConfig::gather(), env_file_loaded)
    }

    /// Compose configuration from an already gathered environment. Tests use
    /// this to avoid mutating process-wide variables.
    pub fn load_with_env(
        &self,
        env: EnvConfig,
        env_file_loaded: bool,
    ) -> Result<ConfigLoad, ConfigLoadError> {
        let (file_config, config_path) = self.load_file_config(&env)?;
        let (config, warnings) =
            compose_config(file_config, env, config_path, env_file_loaded)?;
        Ok(ConfigLoad { config, warnings })
    }

    fn load_file_config(
        &self,
        env: &EnvConfig,
    ) -> Result<(Option<FileConfig>, Option<PathBuf>), ConfigLoadError> {
        let (path, required) = if let Some(explicit) = &self.options.config_path
        {
            (explicit.clone(), true)
        } else if let Some(from_env) = &env.config_path {
            (from_env.clone(), true)
        } else if let Some(found) = DEFAULT_CONFIG_LOCATIONS
            .iter()
            .find(|candidate| candidate.exists())
        {
            (found.clone(), false)
        } else {
            return Ok((None, None));
        };

        if !path.exists() {
            if required {
                return Err(ConfigLoadError::MissingConfig { path });
            }
            return Ok((None, None));
        }

        let contents =
            fs::read_to_string(&path).map_err(|err| ConfigLoadError::Io {
                path: path.clone(),
                source: err,
            })?;
        let file_config: FileConfig =
            toml::from_str(&contents).map_err(|err| ConfigLoadError::Parse {
                path: path.clone(),
                source: err,
            })?;

        Ok((Some(file_config), Some(path)))
    }
}

fn compose_config(
    file_config: Option<FileConfig>,
    env: EnvConfig,
    config_path: Option<PathBuf>,
    env_file_loaded: bool,
) -> Result<(Config, ConfigWarnings), ConfigLoadError> {
    let mut warnings = ConfigWarnings::default();

    if config_path.is_none() {
        warnings.push_with_hint(
            "No secvo.toml detected; falling back to environment variables",
            "Create secvo.toml or set SECVO_CONFIG_PATH to pin a configuration file",
        );
    }

    let FileConfig {
        server: file_server,
        database: file_database,
        cors: file_cors,
        auth: file_auth,
        processor: file_processor,
        dev_mode: file_dev_mode,
    } = file_config.unwrap_or_default();

    let server = ServerConfig {
        host: env
            .server_host
            .or(file_server.host)
            .unwrap_or_else(|| "0.0.0.0".to_string()),
        port: env.server_port.or(file_server.port).unwrap_or(3000),
    };

    let database = DatabaseConfig {
        url: env
            .database_url
            .or(file_database.url)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty()),
        max_connections: env
            .database_max_connections
            .or(file_database.max_connections),
    };

    let cors = CorsConfig {
        allowed_origins: env
            .cors_allowed_origins
            .or(file_cors.allowed_origins)
            .unwrap_or_else(default_cors_origins),
        allow_credentials: env
            .cors_allow_credentials
            .or(file_cors.allow_credentials)
            .unwrap_or(false),
    };

    let auth = AuthConfig {
        password_pepper: env
            .auth_password_pepper
            .or(file_auth.password_pepper)
            .unwrap_or_else(|| DEFAULT_PASSWORD_PEPPER.to_string()),
        token_key: env
            .auth_token_key
            .or(file_auth.token_key)
            .unwrap_or_else(|| DEFAULT_TOKEN_KEY.to_string()),
        session_ttl_hours: env
            .auth_session_ttl_hours
            .or(file_auth.session_ttl_hours)
            .unwrap_or(DEFAULT_SESSION_TTL_HOURS),
    };

    let processor = ProcessorConfig {
        simulated_delay_ms: env
            .scan_simulated_delay_ms
            .or(file_processor.simulated_delay_ms)
            .unwrap_or(DEFAULT_SIMULATED_DELAY_MS),
        auto_dispatch: env
            .scan_auto_dispatch
            .or(file_processor.auto_dispatch)
            .unwrap_or(true),
        sweep_interval_secs: env
            .scan_sweep_interval_secs
            .or(file_processor.sweep_interval_secs)
            .unwrap_or(DEFAULT_SWEEP_INTERVAL_SECS),
        stale_after_secs: env
            .scan_stale_after_secs
            .or(file_processor.stale_after_secs)
            .unwrap_or(DEFAULT_STALE_AFTER_SECS),
        trigger_key: env
            .scan_trigger_key
            .or(file_processor.trigger_key)
            .filter(|key| !key.trim().is_empty()),
    };

    let dev_mode = env.dev_mode.or(file_dev_mode).unwrap_or(false);

    let config = Config {
        server,
        database,
        cors,
        auth,
        processor,
        dev_mode,
        metadata: ConfigMetadata {
            config_path,
            env_file_loaded,
        },
    };

    warnings.extend(validation::apply_guard_rails(&config)?);

    Ok((config, warnings))
}

fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:3000".to_string(),
        "http://localhost:5173".to_string(),
    ]
}

#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("configuration file missing: {path}")]
    MissingConfig { path: PathBuf },
    #[error("failed to read configuration {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error(transparent)]
    GuardRail(#[from] ConfigGuardRailError),
    #[error(transparent)]
    EnvFile(#[from] dotenvy::Error),
}

#[derive(Debug)]
pub struct ConfigLoad {
    pub config: Config,
    pub warnings: ConfigWarnings,
}
