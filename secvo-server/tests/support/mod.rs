#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use secvo_core::{AuthCrypto, InMemoryStore, StoreContext};
use secvo_server::{
    AppState, create_app,
    infra::config::{
        AuthConfig, Config, ConfigMetadata, CorsConfig, DatabaseConfig,
        ProcessorConfig, ServerConfig,
    },
};
use serde_json::Value;
use tower::ServiceExt;

#[derive(Debug, Clone, Default)]
pub struct TestOptions {
    pub auto_dispatch: bool,
    pub trigger_key: Option<String>,
    pub simulated_delay_ms: u64,
}

#[derive(Debug)]
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub store: InMemoryStore,
}

pub fn test_config(options: &TestOptions) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        },
        database: DatabaseConfig::default(),
        cors: CorsConfig {
            allowed_origins: vec!["http://localhost:5173".into()],
            allow_credentials: false,
        },
        auth: AuthConfig {
            password_pepper: "test-pepper".into(),
            token_key: "test-token-key".into(),
            session_ttl_hours: 24,
        },
        processor: ProcessorConfig {
            simulated_delay_ms: options.simulated_delay_ms,
            auto_dispatch: options.auto_dispatch,
            sweep_interval_secs: 0,
            stale_after_secs: 120,
            trigger_key: options.trigger_key.clone(),
        },
        dev_mode: true,
        metadata: ConfigMetadata::default(),
    }
}

pub fn build_test_app(options: TestOptions) -> TestApp {
    let store = InMemoryStore::new();
    let crypto = AuthCrypto::for_tests("test-pepper", "test-token-key")
        .expect("test crypto");
    let state = AppState::new(
        Arc::new(test_config(&options)),
        StoreContext::from_memory(store.clone()),
        Arc::new(crypto),
    );

    TestApp {
        router: create_app(state.clone()),
        state,
        store,
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> Response {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Sign up a fresh account and return its bearer token.
    pub async fn sign_up(&self, email: &str) -> String {
        let response = self
            .send(json_request(
                "POST",
                "/api/v1/auth/signup",
                None,
                &serde_json::json!({ "email": email, "password": "correct horse" }),
            ))
            .await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let body = read_json(response).await;
        body["data"]["access_token"]
            .as_str()
            .expect("access token")
            .to_string()
    }
}

pub fn json_request(
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: &Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder
        .body(Body::from(serde_json::to_vec(body).expect("json body")))
        .expect("request")
}

pub fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).expect("request")
}

pub async fn read_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json response")
}
