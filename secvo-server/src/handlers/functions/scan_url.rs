//! `POST /functions/v1/scan-url`: the externally callable processing
//! trigger. Its response shapes are flat (`{"error": ...}`) and always carry
//! permissive CORS headers, independent of the dashboard API.

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use constant_time_eq::constant_time_eq;
use secvo_core::{
    ProcessError,
    model::{ProcessScanRequest, ProcessScanResponse, ScanId},
};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    infra::app_state::AppState, users::auth::middleware::extract_bearer_token,
};

pub const ALLOWED_HEADERS: &str =
    "authorization, x-client-info, apikey, content-type";

const API_KEY_HEADER: &str = "apikey";

#[derive(Debug)]
pub enum TriggerError {
    InvalidApiKey,
    MissingParameters,
    InvalidScanId,
    NotFound,
    Internal(String),
}

impl TriggerError {
    fn status(&self) -> StatusCode {
        match self {
            TriggerError::InvalidApiKey => StatusCode::UNAUTHORIZED,
            TriggerError::MissingParameters | TriggerError::InvalidScanId => {
                StatusCode::BAD_REQUEST
            }
            TriggerError::NotFound => StatusCode::NOT_FOUND,
            TriggerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> &str {
        match self {
            TriggerError::InvalidApiKey => "Invalid API key",
            TriggerError::MissingParameters => "Missing required parameters",
            TriggerError::InvalidScanId => "Invalid scanId",
            TriggerError::NotFound => "Scan not found",
            TriggerError::Internal(message) => message.as_str(),
        }
    }
}

impl IntoResponse for TriggerError {
    fn into_response(self) -> Response {
        (self.status(), Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<ProcessError> for TriggerError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::NotFound(_) => TriggerError::NotFound,
            ProcessError::Storage(inner) => {
                error!(error = %inner, "scan processing failed");
                TriggerError::Internal(inner.to_string())
            }
        }
    }
}

pub async fn process_scan(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<ProcessScanResponse>, TriggerError> {
    if let Some(expected) = state.config.processor.trigger_key.as_deref()
        && !presented_key_matches(&headers, expected)
    {
        warn!("processing trigger called with an invalid key");
        return Err(TriggerError::InvalidApiKey);
    }

    // An unparsable body is reported like a missing field, not as a 500.
    let request: ProcessScanRequest = serde_json::from_slice(&body)
        .map_err(|_| TriggerError::MissingParameters)?;

    let (Some(raw_id), Some(url)) = (
        request.scan_id.filter(|id| !id.trim().is_empty()),
        request.url.filter(|url| !url.trim().is_empty()),
    ) else {
        return Err(TriggerError::MissingParameters);
    };

    let scan_id: ScanId =
        raw_id.parse().map_err(|_| TriggerError::InvalidScanId)?;

    info!(%scan_id, %url, "processing trigger invoked");
    let outcome = state.processor().process(scan_id, Some(&url)).await?;

    Ok(Json(outcome.to_response()))
}

/// Preflight answer; the headers come from [`with_trigger_cors`].
pub async fn preflight() -> &'static str {
    "ok"
}

/// Stamps the trigger's CORS headers onto every response it produces,
/// errors included.
pub async fn with_trigger_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static("*"),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOWED_HEADERS),
    );
    response
}

fn presented_key_matches(headers: &HeaderMap, expected: &str) -> bool {
    let api_key = headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim);

    let matches = |presented: Option<&str>| {
        presented.is_some_and(|presented| {
            constant_time_eq(presented.as_bytes(), expected.as_bytes())
        })
    };

    // Both headers are always compared; no short-circuit.
    let by_api_key = matches(api_key);
    let by_bearer = matches(extract_bearer_token(headers));
    by_api_key | by_bearer
}
