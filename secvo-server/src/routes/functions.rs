use axum::{Router, middleware, routing::post};

use crate::{AppState, handlers::functions::scan_url};

/// Processing trigger, mounted outside the dashboard CORS policy.
pub fn create_functions_router() -> Router<AppState> {
    Router::new()
        .route(
            "/functions/v1/scan-url",
            post(scan_url::process_scan).options(scan_url::preflight),
        )
        .layer(middleware::map_response(scan_url::with_trigger_cors))
}
