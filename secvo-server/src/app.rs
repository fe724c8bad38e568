use axum::{
    Json, Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    routing::get,
};
use serde_json::{Value, json};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::{AppState, routes};

pub fn create_app(state: AppState) -> Router {
    let versioned_api =
        routes::create_api_router(state.clone()).layer(build_cors_layer(&state));

    Router::new()
        .route("/ping", get(ping_handler))
        .route("/health", get(health_handler))
        .merge(versioned_api)
        // The trigger answers its own preflights with fixed headers.
        .merge(routes::functions::create_functions_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Permissive in dev mode, allow-list otherwise.
fn build_cors_layer(state: &AppState) -> CorsLayer {
    let cors = &state.config.cors;
    if state.config.dev_mode {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = cors
        .allowed_origins
        .iter()
        .filter(|origin| origin.trim() != "*")
        .filter_map(|origin| HeaderValue::from_str(origin.trim()).ok())
        .collect();
    let allow_origin = if origins.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(origins)
    };

    let layer = CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    // tower-http refuses credentials together with a wildcard origin.
    if cors.allow_credentials && !cors.is_wildcard_included() {
        layer.allow_credentials(true)
    } else {
        layer
    }
}

async fn ping_handler() -> Json<Value> {
    info!("Ping endpoint called");
    Json(json!({
        "status": "ok",
        "message": "Secvo scan service is running",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler(
    State(state): State<AppState>,
) -> (StatusCode, Json<Value>) {
    let mut health_status = json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
        "checks": {}
    });

    let status = match state.store.scans().ping().await {
        Ok(()) => {
            let mut database = json!({
                "status": "healthy",
                "backend": state.store.backend_name(),
            });
            if let Some(stats) = state.store.pool_stats() {
                database["connection_pool"] = json!({
                    "size": stats.size,
                    "idle": stats.idle,
                    "max_size": stats.max_size,
                });
            }
            health_status["checks"]["database"] = database;
            StatusCode::OK
        }
        Err(err) => {
            warn!(error = %err, "health check failed");
            health_status["checks"]["database"] = json!({
                "status": "unhealthy",
                "backend": state.store.backend_name(),
                "error": err.to_string(),
            });
            health_status["status"] = json!("unhealthy");
            StatusCode::SERVICE_UNAVAILABLE
        }
    };

    (status, Json(health_status))
}
