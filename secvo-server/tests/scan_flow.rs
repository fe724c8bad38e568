mod support;

use std::time::Duration;

use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use secvo_core::{
    ScanRepository, finding_count_range,
    model::{RiskLevel, ScanId},
};
use serde_json::{Value, json};
use support::{
    TestApp, TestOptions, build_test_app, get_request, json_request, read_json,
};

async fn submit(app: &TestApp, token: Option<&str>, url: &str) -> (StatusCode, Value) {
    let response = app
        .send(json_request("POST", "/api/v1/scans", token, &json!({ "url": url })))
        .await;
    let status = response.status();
    (status, read_json(response).await)
}

async fn trigger(app: &TestApp, scan_id: &str, url: &str) -> (StatusCode, Value) {
    let response = app
        .send(json_request(
            "POST",
            "/functions/v1/scan-url",
            None,
            &json!({ "scanId": scan_id, "url": url }),
        ))
        .await;
    let status = response.status();
    (status, read_json(response).await)
}

fn risk_of(value: &Value) -> RiskLevel {
    serde_json::from_value(value.clone()).expect("risk level")
}

#[tokio::test]
async fn submitted_scan_completes_after_trigger() {
    let app = build_test_app(TestOptions::default());
    let token = app.sign_up("owner@example.com").await;

    let (status, body) = submit(&app, Some(&token), "https://example.com").await;
    assert_eq!(status, StatusCode::CREATED);
    let scan = &body["data"];
    assert_eq!(scan["status"], "processing");
    assert_eq!(scan["risk_level"], "pending");
    assert_eq!(scan["url"], "https://example.com");
    let scan_id = scan["id"].as_str().unwrap().to_string();

    let (status, outcome) = trigger(&app, &scan_id, "https://example.com").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(outcome["status"], "completed");
    let risk = risk_of(&outcome["risk_level"]);
    assert!(risk.is_assessed());
    let count = outcome["vulnerabilities_count"].as_u64().unwrap() as usize;
    assert!(finding_count_range(risk).contains(&count));

    let report = app
        .send(get_request(&format!("/api/v1/scans/{scan_id}"), Some(&token)))
        .await;
    assert_eq!(report.status(), StatusCode::OK);
    let report = read_json(report).await;
    let data = &report["data"];
    assert_eq!(data["scan"]["status"], "completed");
    assert_eq!(risk_of(&data["scan"]["risk_level"]), risk);
    assert_eq!(data["findings"].as_array().unwrap().len(), count);
    assert_eq!(data["counts"]["total"], count);
    assert!(!data["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn processing_report_has_no_recommendations() {
    let app = build_test_app(TestOptions::default());
    let token = app.sign_up("patient@example.com").await;
    let (_, body) = submit(&app, Some(&token), "https://slow.example").await;
    let scan_id = body["data"]["id"].as_str().unwrap();

    let report = app
        .send(get_request(&format!("/api/v1/scans/{scan_id}"), Some(&token)))
        .await;
    assert_eq!(report.status(), StatusCode::OK);
    let report = read_json(report).await;
    assert_eq!(report["data"]["scan"]["status"], "processing");
    assert_eq!(report["data"]["counts"]["total"], 0);
    assert!(report["data"]["recommendations"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn empty_url_is_rejected_without_creating_a_scan() {
    let app = build_test_app(TestOptions::default());
    let token = app.sign_up("empty@example.com").await;

    let (status, body) = submit(&app, Some(&token), "   ").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["message"], "Please enter a website URL");

    let list = read_json(app.send(get_request("/api/v1/scans", Some(&token))).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn anonymous_calls_are_sent_to_sign_in() {
    let app = build_test_app(TestOptions::default());

    let (status, body) = submit(&app, None, "https://example.com").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["message"], "Please sign in to scan websites");
    assert_eq!(body["error"]["redirect"], "/signin");

    let list = app.send(get_request("/api/v1/scans", None)).await;
    assert_eq!(list.status(), StatusCode::UNAUTHORIZED);

    let report = app
        .send(get_request(&format!("/api/v1/scans/{}", ScanId::new()), None))
        .await;
    assert_eq!(report.status(), StatusCode::UNAUTHORIZED);
    let report = read_json(report).await;
    assert_eq!(report["error"]["message"], "Please sign in to view scan results");

    let bogus = app.send(get_request("/api/v1/scans/not-a-uuid", None)).await;
    assert_eq!(bogus.status(), StatusCode::UNAUTHORIZED);
}

fn plain_text_submit(token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/scans")
        .header(header::CONTENT_TYPE, "text/plain");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from("https://example.com")).unwrap()
}

#[tokio::test]
async fn sign_in_is_demanded_before_the_body_is_judged() {
    let app = build_test_app(TestOptions::default());

    let anonymous = app.send(plain_text_submit(None)).await;
    assert_eq!(anonymous.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(anonymous).await;
    assert_eq!(body["error"]["message"], "Please sign in to scan websites");
    assert_eq!(body["error"]["redirect"], "/signin");

    let token = app.sign_up("plain@example.com").await;
    let signed_in = app.send(plain_text_submit(Some(&token))).await;
    assert_eq!(signed_in.status(), StatusCode::BAD_REQUEST);

    let list = read_json(app.send(get_request("/api/v1/scans", Some(&token))).await).await;
    assert!(list["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn dashboard_lists_only_own_scans_newest_first() {
    let app = build_test_app(TestOptions::default());
    let alice = app.sign_up("alice@example.com").await;
    let mallory = app.sign_up("mallory@example.com").await;

    let (_, first) = submit(&app, Some(&alice), "https://one.example").await;
    tokio::time::sleep(Duration::from_millis(5)).await;
    let (_, second) = submit(&app, Some(&alice), "https://two.example").await;
    submit(&app, Some(&mallory), "https://evil.example").await;

    let list = read_json(app.send(get_request("/api/v1/scans", Some(&alice))).await).await;
    let scans = list["data"].as_array().unwrap();
    assert_eq!(scans.len(), 2);
    assert_eq!(scans[0]["id"], second["data"]["id"]);
    assert_eq!(scans[1]["id"], first["data"]["id"]);
}

#[tokio::test]
async fn foreign_and_unknown_scans_are_not_found() {
    let app = build_test_app(TestOptions::default());
    let alice = app.sign_up("alice@example.com").await;
    let mallory = app.sign_up("mallory@example.com").await;
    let (_, body) = submit(&app, Some(&alice), "https://private.example").await;
    let scan_id = body["data"]["id"].as_str().unwrap();

    let foreign = app
        .send(get_request(&format!("/api/v1/scans/{scan_id}"), Some(&mallory)))
        .await;
    assert_eq!(foreign.status(), StatusCode::NOT_FOUND);

    let unknown = app
        .send(get_request(&format!("/api/v1/scans/{}", ScanId::new()), Some(&alice)))
        .await;
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);

    let malformed = app
        .send(get_request("/api/v1/scans/not-a-uuid", Some(&alice)))
        .await;
    assert_eq!(malformed.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn auto_dispatch_completes_without_trigger() {
    let app = build_test_app(TestOptions {
        auto_dispatch: true,
        ..TestOptions::default()
    });
    let token = app.sign_up("auto@example.com").await;
    let (status, body) = submit(&app, Some(&token), "https://auto.example").await;
    assert_eq!(status, StatusCode::CREATED);
    let scan_id: ScanId = body["data"]["id"].as_str().unwrap().parse().unwrap();

    let mut completed = None;
    for _ in 0..200 {
        let scan = app.store.get_scan(scan_id).await.unwrap().unwrap();
        if scan.is_terminal() {
            completed = Some(scan);
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }

    let scan = completed.expect("scan should complete in the background");
    let risk = scan.risk_level.expect("completed scan has a risk level");
    assert!(risk.is_assessed());
    let findings = app.store.list_findings(scan_id).await.unwrap();
    assert!(finding_count_range(risk).contains(&findings.len()));
}
