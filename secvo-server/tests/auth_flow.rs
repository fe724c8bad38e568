mod support;

use axum::http::StatusCode;
use serde_json::json;
use support::{TestOptions, build_test_app, get_request, json_request, read_json};

#[tokio::test]
async fn sign_up_then_fetch_profile() {
    let app = build_test_app(TestOptions::default());

    let response = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            &json!({ "email": "  Alice@Example.com ", "password": "long enough" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = read_json(response).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["token_type"], "Bearer");
    assert_eq!(body["data"]["expires_in"], 24 * 3600);
    assert_eq!(body["data"]["user"]["email"], "alice@example.com");
    let token = body["data"]["access_token"].as_str().unwrap().to_string();

    let me = app.send(get_request("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(me.status(), StatusCode::OK);
    let me = read_json(me).await;
    assert_eq!(me["data"]["email"], "alice@example.com");
    assert_eq!(me["data"]["id"], body["data"]["user"]["id"]);
}

#[tokio::test]
async fn sign_in_accepts_correct_password_only() {
    let app = build_test_app(TestOptions::default());
    app.sign_up("bob@example.com").await;

    let ok = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signin",
            None,
            &json!({ "email": "bob@example.com", "password": "correct horse" }),
        ))
        .await;
    assert_eq!(ok.status(), StatusCode::OK);

    let wrong = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signin",
            None,
            &json!({ "email": "bob@example.com", "password": "battery staple" }),
        ))
        .await;
    assert_eq!(wrong.status(), StatusCode::UNAUTHORIZED);
    let wrong_body = read_json(wrong).await;

    let unknown = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signin",
            None,
            &json!({ "email": "nobody@example.com", "password": "correct horse" }),
        ))
        .await;
    assert_eq!(unknown.status(), StatusCode::UNAUTHORIZED);
    let unknown_body = read_json(unknown).await;

    assert_eq!(
        wrong_body["error"]["message"],
        unknown_body["error"]["message"]
    );
}

#[tokio::test]
async fn sign_up_rejects_bad_input_and_duplicates() {
    let app = build_test_app(TestOptions::default());

    let weak = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            &json!({ "email": "carol@example.com", "password": "short" }),
        ))
        .await;
    assert_eq!(weak.status(), StatusCode::BAD_REQUEST);

    let invalid = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            &json!({ "email": "not-an-email", "password": "long enough" }),
        ))
        .await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    app.sign_up("carol@example.com").await;
    let duplicate = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signup",
            None,
            &json!({ "email": "CAROL@example.com", "password": "long enough" }),
        ))
        .await;
    assert_eq!(duplicate.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn sign_out_revokes_the_token() {
    let app = build_test_app(TestOptions::default());
    let token = app.sign_up("dave@example.com").await;

    let signed_out = app
        .send(json_request(
            "POST",
            "/api/v1/auth/signout",
            Some(&token),
            &json!({}),
        ))
        .await;
    assert_eq!(signed_out.status(), StatusCode::NO_CONTENT);

    let me = app.send(get_request("/api/v1/auth/me", Some(&token))).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(me).await;
    assert_eq!(body["error"]["redirect"], "/signin");
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = build_test_app(TestOptions::default());

    let me = app.send(get_request("/api/v1/auth/me", None)).await;
    assert_eq!(me.status(), StatusCode::UNAUTHORIZED);

    let garbage = app
        .send(get_request("/api/v1/auth/me", Some("not-a-real-token")))
        .await;
    assert_eq!(garbage.status(), StatusCode::UNAUTHORIZED);
}
