//! Dashboard endpoints: intake and the owner's view of their scans.

use axum::{
    Extension, Json,
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
};
use secvo_core::{
    ViewerError,
    model::{ApiResponse, Scan, ScanId, ScanReport, Session, SubmitScanRequest},
};
use tracing::debug;

use crate::infra::{
    app_state::AppState,
    errors::{AppError, AppResult},
};

pub async fn submit_scan(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
    body: Bytes,
) -> AppResult<(StatusCode, Json<ApiResponse<Scan>>)> {
    let session = session.map(|Extension(session)| session);

    // Intake turns anonymous callers away before the body matters.
    let url = match serde_json::from_slice::<SubmitScanRequest>(&body) {
        Ok(request) => request.url,
        Err(_) if session.is_none() => String::new(),
        Err(err) => {
            return Err(AppError::bad_request(format!(
                "Invalid request body: {err}"
            )));
        }
    };
    let scan = state.intake.submit(session.as_ref(), &url).await?;

    if state.config.processor.auto_dispatch {
        state.dispatcher.dispatch(scan.id, Some(scan.url.clone()));
    } else {
        debug!(scan_id = %scan.id, "auto dispatch disabled; awaiting trigger");
    }

    Ok((
        StatusCode::CREATED,
        Json(
            ApiResponse::success(scan)
                .with_message("Scan started".to_string()),
        ),
    ))
}

pub async fn list_scans(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
) -> AppResult<Json<ApiResponse<Vec<Scan>>>> {
    let session = session.map(|Extension(session)| session);
    let scans = state.viewer.dashboard(session.as_ref()).await?;
    Ok(Json(ApiResponse::success(scans)))
}

pub async fn get_scan_report(
    State(state): State<AppState>,
    session: Option<Extension<Session>>,
    Path(raw_id): Path<String>,
) -> AppResult<Json<ApiResponse<ScanReport>>> {
    let session = session.map(|Extension(session)| session);

    // An unparsable id can never name one of the caller's scans.
    let Ok(scan_id) = raw_id.parse::<ScanId>() else {
        return Err(match session {
            Some(_) => ViewerError::NotFound,
            None => ViewerError::Unauthenticated,
        }
        .into());
    };

    let report = state.viewer.report(session.as_ref(), scan_id).await?;
    Ok(Json(ApiResponse::success(report)))
}
