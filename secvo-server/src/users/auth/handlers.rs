use axum::{Extension, Json, extract::State, http::StatusCode};
use secvo_core::model::{
    ApiResponse, AuthTokens, Credentials, Session, UserProfile,
};
use tracing::info;

use crate::infra::{app_state::AppState, errors::AppResult};

pub async fn sign_up(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<(StatusCode, Json<ApiResponse<AuthTokens>>)> {
    let tokens = state.auth.sign_up(credentials).await?;
    info!(user_id = %tokens.user.id, "user signed up");
    Ok((StatusCode::CREATED, Json(ApiResponse::success(tokens))))
}

pub async fn sign_in(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> AppResult<Json<ApiResponse<AuthTokens>>> {
    let tokens = state.auth.sign_in(credentials).await?;
    Ok(Json(ApiResponse::success(tokens)))
}

pub async fn sign_out(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<StatusCode> {
    state.auth.sign_out(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me(
    State(state): State<AppState>,
    Extension(session): Extension<Session>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let profile = state.auth.profile(&session).await?;
    Ok(Json(ApiResponse::success(profile)))
}
