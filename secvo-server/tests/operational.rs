mod support;

use axum::http::StatusCode;
use support::{TestOptions, build_test_app, get_request, read_json};

#[tokio::test]
async fn ping_reports_version() {
    let app = build_test_app(TestOptions::default());
    let response = app.send(get_request("/ping", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn health_checks_the_store() {
    let app = build_test_app(TestOptions::default());
    let response = app.send(get_request("/health", None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["checks"]["database"]["backend"], "memory");
    assert!(body["checks"]["database"].get("connection_pool").is_none());
}

#[tokio::test]
async fn dashboard_api_answers_cors_preflight() {
    let app = build_test_app(TestOptions::default());
    let response = app
        .send(
            axum::http::Request::builder()
                .method("OPTIONS")
                .uri("/api/v1/scans")
                .header("origin", "http://localhost:5173")
                .header("access-control-request-method", "POST")
                .body(axum::body::Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(
        response
            .headers()
            .contains_key("access-control-allow-origin")
    );
}
