use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{
    AppState,
    handlers::scans,
    users::auth::{self, auth_middleware, optional_auth_middleware},
};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoints
        .route("/auth/signup", post(auth::handlers::sign_up))
        .route("/auth/signin", post(auth::handlers::sign_in))
        .merge(create_session_routes(state.clone()))
        .merge(create_scan_routes(state))
}

fn create_session_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/auth/signout", post(auth::handlers::sign_out))
        .route("/auth/me", get(auth::handlers::me))
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}

/// Scan routes resolve the session when present; intake and the viewer
/// decide what an anonymous call means.
fn create_scan_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/scans",
            post(scans::submit_scan).get(scans::list_scans),
        )
        .route("/scans/{id}", get(scans::get_scan_report))
        .route_layer(middleware::from_fn_with_state(
            state,
            optional_auth_middleware,
        ))
}
