mod support;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use secvo_core::{ScanRepository, model::ScanId};
use serde_json::json;
use support::{TestApp, TestOptions, build_test_app, json_request, read_json};

const TRIGGER: &str = "/functions/v1/scan-url";

async fn submitted_scan(app: &TestApp) -> String {
    let token = app.sign_up("trigger@example.com").await;
    let response = app
        .send(json_request(
            "POST",
            "/api/v1/scans",
            Some(&token),
            &json!({ "url": "https://example.com" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    read_json(response).await["data"]["id"]
        .as_str()
        .unwrap()
        .to_string()
}

fn assert_trigger_cors(response: &axum::response::Response) {
    let headers = response.headers();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert_eq!(
        headers[header::ACCESS_CONTROL_ALLOW_HEADERS],
        "authorization, x-client-info, apikey, content-type"
    );
}

#[tokio::test]
async fn preflight_answers_with_cors_headers() {
    let app = build_test_app(TestOptions::default());
    let response = app
        .send(
            Request::builder()
                .method("OPTIONS")
                .uri(TRIGGER)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_trigger_cors(&response);
}

#[tokio::test]
async fn missing_parameters_are_rejected() {
    let app = build_test_app(TestOptions::default());

    for body in [
        json!({}),
        json!({ "scanId": ScanId::new().to_string() }),
        json!({ "url": "https://example.com" }),
        json!({ "scanId": "", "url": "https://example.com" }),
    ] {
        let response = app.send(json_request("POST", TRIGGER, None, &body)).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_trigger_cors(&response);
        let json = read_json(response).await;
        assert_eq!(json["error"], "Missing required parameters");
    }
}

#[tokio::test]
async fn non_json_body_is_missing_parameters() {
    let app = build_test_app(TestOptions::default());
    let response = app
        .send(
            Request::builder()
                .method("POST")
                .uri(TRIGGER)
                .body(Body::from("scanId=abc"))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "Missing required parameters");
}

#[tokio::test]
async fn malformed_and_unknown_ids_are_reported() {
    let app = build_test_app(TestOptions::default());

    let response = app
        .send(json_request(
            "POST",
            TRIGGER,
            None,
            &json!({ "scanId": "not-a-uuid", "url": "https://example.com" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error"], "Invalid scanId");

    let response = app
        .send(json_request(
            "POST",
            TRIGGER,
            None,
            &json!({ "scanId": ScanId::new().to_string(), "url": "https://example.com" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_trigger_cors(&response);
    assert_eq!(read_json(response).await["error"], "Scan not found");
}

#[tokio::test]
async fn repeated_trigger_does_not_duplicate_findings() {
    let app = build_test_app(TestOptions::default());
    let scan_id = submitted_scan(&app).await;
    let body = json!({ "scanId": scan_id, "url": "https://example.com" });

    let first = app.send(json_request("POST", TRIGGER, None, &body)).await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_trigger_cors(&first);
    let first = read_json(first).await;

    let second = app.send(json_request("POST", TRIGGER, None, &body)).await;
    assert_eq!(second.status(), StatusCode::OK);
    let second = read_json(second).await;

    assert_eq!(first, second);
    let id: ScanId = scan_id.parse().unwrap();
    let findings = app.store.list_findings(id).await.unwrap();
    assert_eq!(
        findings.len() as u64,
        first["vulnerabilities_count"].as_u64().unwrap()
    );
}

#[tokio::test]
async fn concurrent_triggers_settle_once() {
    // The delay keeps both requests in flight up to the guarded completion.
    let app = build_test_app(TestOptions {
        simulated_delay_ms: 20,
        ..TestOptions::default()
    });
    let scan_id = submitted_scan(&app).await;
    let body = json!({ "scanId": scan_id, "url": "https://example.com" });

    let (a, b) = tokio::join!(
        app.send(json_request("POST", TRIGGER, None, &body)),
        app.send(json_request("POST", TRIGGER, None, &body)),
    );
    assert_eq!(a.status(), StatusCode::OK);
    assert_eq!(b.status(), StatusCode::OK);
    let (a, b) = (read_json(a).await, read_json(b).await);
    assert_eq!(a, b);

    let id: ScanId = scan_id.parse().unwrap();
    let findings = app.store.list_findings(id).await.unwrap();
    assert_eq!(findings.len() as u64, a["vulnerabilities_count"].as_u64().unwrap());
}

#[tokio::test]
async fn configured_key_is_required() {
    let app = build_test_app(TestOptions {
        trigger_key: Some("s3cret".into()),
        ..TestOptions::default()
    });
    let scan_id = submitted_scan(&app).await;
    let body = json!({ "scanId": scan_id, "url": "https://example.com" });

    let denied = app.send(json_request("POST", TRIGGER, None, &body)).await;
    assert_eq!(denied.status(), StatusCode::UNAUTHORIZED);
    assert_trigger_cors(&denied);
    assert_eq!(read_json(denied).await["error"], "Invalid API key");

    let wrong = app
        .send(json_request("POST", TRIGGER, Some("nope"), &body))
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);

    let mut request = json_request("POST", TRIGGER, None, &body);
    request
        .headers_mut()
        .insert("apikey", "s3cret".parse().unwrap());
    let allowed = app.send(request).await;
    assert_eq!(allowed.status(), StatusCode::OK);

    let bearer = app
        .send(json_request("POST", TRIGGER, Some("s3cret"), &body))
        .await;
    assert_eq!(bearer.status(), StatusCode::OK);
}
