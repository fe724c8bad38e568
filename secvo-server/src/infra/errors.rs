use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secvo_core::{AuthError, CoreError, IntakeError, ViewerError};
use serde_json::json;
use std::fmt;

pub type AppResult<T> = Result<T, AppError>;

/// Path the dashboard sends unauthenticated callers to.
pub const SIGN_IN_PATH: &str = "/signin";

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
    pub redirect: Option<String>,
}

impl AppError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            redirect: None,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message)
    }

    /// 401 that tells the client where to sign in.
    pub fn sign_in_required(message: impl Into<String>) -> Self {
        Self::unauthorized(message).with_redirect(SIGN_IN_PATH)
    }

    pub fn with_redirect(mut self, redirect: impl Into<String>) -> Self {
        self.redirect = Some(redirect.into());
        self
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for AppError {}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut error = json!({
            "message": self.message,
            "status": self.status.as_u16(),
        });
        if let Some(redirect) = self.redirect {
            error["redirect"] = json!(redirect);
        }

        (self.status, Json(json!({ "error": error }))).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Conflict(msg) => Self::conflict(msg),
            other => {
                tracing::error!(error = %other, "store operation failed");
                Self::internal("Database operation failed")
            }
        }
    }
}

impl From<IntakeError> for AppError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Unauthenticated => {
                Self::sign_in_required(err.to_string())
            }
            IntakeError::EmptyUrl => Self::bad_request(err.to_string()),
            IntakeError::Storage(inner) => inner.into(),
        }
    }
}

impl From<ViewerError> for AppError {
    fn from(err: ViewerError) -> Self {
        match err {
            ViewerError::Unauthenticated => {
                Self::sign_in_required(err.to_string())
            }
            ViewerError::NotFound => Self::not_found(err.to_string()),
            ViewerError::Storage(inner) => inner.into(),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidEmail | AuthError::WeakPassword { .. } => {
                Self::bad_request(err.to_string())
            }
            AuthError::EmailTaken => Self::conflict(err.to_string()),
            AuthError::InvalidCredentials => {
                Self::unauthorized(err.to_string())
            }
            AuthError::InvalidToken => Self::sign_in_required(err.to_string()),
            AuthError::Storage(inner) => inner.into(),
            AuthError::Crypto(_) | AuthError::Internal(_) => {
                tracing::error!(error = %err, "authentication failure");
                Self::internal("Authentication failed")
            }
        }
    }
}
