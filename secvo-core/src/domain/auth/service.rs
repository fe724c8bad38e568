use std::{fmt, sync::Arc};

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use secvo_model::{AuthTokens, Credentials, Session, UserProfile};
use thiserror::Error;
use tracing::{debug, info};

use crate::{
    database::ports::{
        sessions::{NewSession, SessionRepository},
        users::{NewUser, UserRecord, UserRepository},
    },
    domain::auth::crypto::{AuthCrypto, AuthCryptoError},
    error::CoreError,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;
const DEFAULT_SESSION_TTL_HOURS: i64 = 24;
const TOKEN_TYPE: &str = "Bearer";

static EMAIL_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$")
        .expect("email regex should compile")
});

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Please enter a valid email address")]
    InvalidEmail,
    #[error("Password must be at least {min} characters")]
    WeakPassword { min: usize },
    #[error("An account with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Session is invalid or expired")]
    InvalidToken,
    #[error(transparent)]
    Crypto(#[from] AuthCryptoError),
    #[error(transparent)]
    Storage(#[from] CoreError),
    #[error("authentication task failed: {0}")]
    Internal(String),
}

/// Account registration, sign-in and bearer-session resolution.
#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
    crypto: Arc<AuthCrypto>,
    session_ttl: Duration,
}

impl fmt::Debug for AuthService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthService")
            .field("crypto", &self.crypto)
            .field("session_ttl", &self.session_ttl)
            .finish_non_exhaustive()
    }
}

impl AuthService {
    pub fn new(
        users: Arc<dyn UserRepository>,
        sessions: Arc<dyn SessionRepository>,
        crypto: Arc<AuthCrypto>,
    ) -> Self {
        Self {
            users,
            sessions,
            crypto,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_session_ttl(mut self, ttl: Duration) -> Self {
        self.session_ttl = ttl;
        self
    }

    pub fn session_ttl(&self) -> Duration {
        self.session_ttl
    }

    pub async fn sign_up(
        &self,
        credentials: Credentials,
    ) -> Result<AuthTokens, AuthError> {
        let email = normalize_email(&credentials.email);
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(AuthError::InvalidEmail);
        }
        if credentials.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::WeakPassword {
                min: MIN_PASSWORD_LENGTH,
            });
        }

        if self.users.find_by_email(&email).await?.is_some() {
            return Err(AuthError::EmailTaken);
        }

        let crypto = Arc::clone(&self.crypto);
        let password = credentials.password;
        let password_hash =
            tokio::task::spawn_blocking(move || crypto.hash_password(&password))
                .await
                .map_err(|err| AuthError::Internal(err.to_string()))??;

        let user = self
            .users
            .create_user(NewUser {
                email,
                password_hash,
            })
            .await
            .map_err(|err| match err {
                CoreError::Conflict(_) => AuthError::EmailTaken,
                other => AuthError::Storage(other),
            })?;

        info!(user_id = %user.id, "account created");
        self.issue_session(&user).await
    }

    /// Every failure mode (unknown email, wrong password) maps to the same
    /// `InvalidCredentials` error.
    pub async fn sign_in(
        &self,
        credentials: Credentials,
    ) -> Result<AuthTokens, AuthError> {
        let email = normalize_email(&credentials.email);
        let Some(user) = self.users.find_by_email(&email).await? else {
            debug!("sign-in for unknown email");
            return Err(AuthError::InvalidCredentials);
        };

        let crypto = Arc::clone(&self.crypto);
        let password = credentials.password;
        let stored_hash = user.password_hash.clone();
        let verified = tokio::task::spawn_blocking(move || {
            crypto.verify_password(&password, &stored_hash)
        })
        .await
        .map_err(|err| AuthError::Internal(err.to_string()))?
        .unwrap_or(false);

        if !verified {
            debug!(user_id = %user.id, "sign-in with wrong password");
            return Err(AuthError::InvalidCredentials);
        }

        self.issue_session(&user).await
    }

    async fn issue_session(
        &self,
        user: &UserRecord,
    ) -> Result<AuthTokens, AuthError> {
        let access_token = self.crypto.generate_token()?;
        let token_hash = self.crypto.hash_token(&access_token);
        let expires_at = Utc::now() + self.session_ttl;

        self.sessions
            .create_session(NewSession {
                user_id: user.id,
                token_hash,
                expires_at,
            })
            .await?;

        Ok(AuthTokens {
            access_token,
            token_type: TOKEN_TYPE.to_string(),
            expires_in: self.session_ttl.num_seconds(),
            user: user.profile(),
        })
    }

    /// Resolve a bearer token to the session it identifies. Unknown, revoked
    /// and expired tokens resolve to `None`.
    pub async fn resolve(
        &self,
        token: &str,
    ) -> Result<Option<Session>, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Ok(None);
        }

        let now = Utc::now();
        let hashed = self.crypto.hash_token(token);
        let Some(record) = self
            .sessions
            .find_active_by_token_hash(&hashed, now)
            .await?
        else {
            return Ok(None);
        };

        let Some(user) = self.users.get_user(record.user_id).await? else {
            return Ok(None);
        };

        Ok(Some(Session {
            session_id: record.id,
            user_id: user.id,
            email: user.email,
            expires_at: record.expires_at,
        }))
    }

    pub async fn sign_out(&self, session: &Session) -> Result<(), AuthError> {
        let revoked = self.sessions.revoke(session.session_id, Utc::now()).await?;
        debug!(session_id = %session.session_id, revoked, "session signed out");
        Ok(())
    }

    pub async fn profile(
        &self,
        session: &Session,
    ) -> Result<UserProfile, AuthError> {
        self.users
            .get_user(session.user_id)
            .await?
            .map(|user| user.profile())
            .ok_or(AuthError::InvalidToken)
    }

    pub async fn purge_expired_sessions(
        &self,
        before: DateTime<Utc>,
    ) -> Result<u64, AuthError> {
        Ok(self.sessions.purge_expired(before).await?)
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
