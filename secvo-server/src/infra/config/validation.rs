use thiserror::Error;
use url::Url;

use super::models::{AuthConfig, Config, DatabaseConfig};

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("DATABASE_URL is required when DEV_MODE is false")]
    MissingDatabaseUrl,
    #[error("invalid database URL")]
    InvalidDatabaseUrl {
        #[source]
        source: url::ParseError,
    },
    #[error("unsupported database scheme '{scheme}'; expected postgres or postgresql")]
    UnsupportedDatabaseScheme { scheme: String },
    #[error("session lifetime must be positive, got {hours} hours")]
    InvalidSessionTtl { hours: i64 },
}

#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push<S: Into<String>>(&mut self, message: S) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: None,
        });
    }

    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();

    validate_database(&config.database, config.dev_mode, &mut warnings)?;

    if config.auth.session_ttl_hours <= 0 {
        return Err(ConfigGuardRailError::InvalidSessionTtl {
            hours: config.auth.session_ttl_hours,
        });
    }

    if !config.dev_mode {
        warn_default_secrets(&config.auth, &mut warnings);
    }

    if config.cors.allow_credentials && config.cors.is_wildcard_included() {
        warnings.push(
            "CORS credentials allowed alongside wildcard origin; browsers will reject such configuration",
        );
    }

    if config.processor.trigger_key.is_none() && !config.dev_mode {
        warnings.push_with_hint(
            "Processing trigger accepts unauthenticated calls",
            "Set SCAN_TRIGGER_KEY to require an apikey header on /functions/v1/scan-url",
        );
    }

    Ok(warnings)
}

fn validate_database(
    database: &DatabaseConfig,
    dev_mode: bool,
    warnings: &mut ConfigWarnings,
) -> Result<(), ConfigGuardRailError> {
    let Some(raw) = database.url.as_deref() else {
        if !dev_mode {
            return Err(ConfigGuardRailError::MissingDatabaseUrl);
        }
        warnings.push_with_hint(
            "DATABASE_URL not configured; using the in-memory store",
            "Data is lost on restart; set DATABASE_URL to persist scans",
        );
        return Ok(());
    };

    let parsed = Url::parse(raw)
        .map_err(|source| ConfigGuardRailError::InvalidDatabaseUrl { source })?;
    match parsed.scheme() {
        "postgres" | "postgresql" => Ok(()),
        other => Err(ConfigGuardRailError::UnsupportedDatabaseScheme {
            scheme: other.to_string(),
        }),
    }
}

fn warn_default_secrets(auth: &AuthConfig, warnings: &mut ConfigWarnings) {
    if auth.is_default_pepper() {
        warnings.push_with_hint(
            "AUTH_PASSWORD_PEPPER uses the default placeholder value",
            "Generate a random secret; changing it later invalidates stored password hashes",
        );
    }
    if auth.is_default_token_key() {
        warnings.push_with_hint(
            "AUTH_TOKEN_KEY uses the default placeholder value",
            "Generate a random secret; changing it later signs out every session",
        );
    }
}
