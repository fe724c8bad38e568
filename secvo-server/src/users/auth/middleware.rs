use axum::{
    extract::{Request, State},
    http::{HeaderMap, header},
    middleware::Next,
    response::Response,
};
use secvo_core::model::Session;
use tracing::warn;

use crate::infra::{app_state::AppState, errors::AppError};

/// Rejects the request unless it carries a live bearer session.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers())
        .map(str::to_owned)
        .ok_or_else(|| AppError::sign_in_required("Authentication required"))?;

    let session = state
        .auth
        .resolve(&token)
        .await?
        .ok_or_else(|| AppError::sign_in_required("Session is invalid or expired"))?;

    request.extensions_mut().insert(session);
    Ok(next.run(request).await)
}

/// Attaches the session when one resolves and lets the handler decide what
/// an anonymous call means.
pub async fn optional_auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(token) =
        extract_bearer_token(request.headers()).map(str::to_owned)
    {
        match state.auth.resolve(&token).await {
            Ok(Some(session)) => {
                request.extensions_mut().insert::<Session>(session);
            }
            Ok(None) => {}
            Err(err) => warn!(error = %err, "session lookup failed"),
        }
    }

    next.run(request).await
}

pub(crate) fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
