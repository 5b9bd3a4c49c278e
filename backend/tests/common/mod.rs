//! Common test utilities for integration tests
//!
//! The app runs over the in-memory document and session stores, so these
//! tests need no external services.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use blog_backend::{config::AppConfig, routes, state::AppState};
use fake::faker::internet::en::Username;
use fake::Fake;
use secrecy::SecretString;
use serde_json::Value;
use tower::ServiceExt;

/// Response as seen by a client
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub cookie: Option<String>,
}

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Application with the default (compatibility) response shapes
    pub fn new() -> Self {
        Self::with_config(test_config())
    }

    /// Application exposing distinct failure codes
    pub fn strict() -> Self {
        let mut config = test_config();
        config.api.compat_mode = false;
        Self::with_config(config)
    }

    pub fn with_config(config: AppConfig) -> Self {
        let state = AppState::in_memory(config);
        let app = routes::create_router(state.clone());
        Self { app, state }
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None, None).await
    }

    /// Make a POST request with JSON body
    pub async fn post(&self, path: &str, body: &Value) -> TestResponse {
        self.request("POST", path, Some(body), None).await
    }

    /// Make a request with an optional JSON body and session cookie
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<&Value>,
        cookie: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(path);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            body,
            cookie,
        }
    }

    /// Sign up and log in a fresh user, returning the session cookie
    pub async fn login_new_user(&self) -> String {
        let creds = serde_json::json!({
            "username": random_username(),
            "password": "CorrectHorse1"
        });
        let signup = self.post("/api/v1/users/signup", &creds).await;
        assert_eq!(signup.status, StatusCode::CREATED);

        let login = self.post("/api/v1/users/login", &creds).await;
        assert_eq!(login.status, StatusCode::OK);
        login.cookie.expect("login sets a session cookie")
    }
}

/// Unique username for a test run
pub fn random_username() -> String {
    let base: String = Username().fake();
    format!("{}_{}", base, uuid::Uuid::new_v4().simple())
}

fn test_config() -> AppConfig {
    let mut config = AppConfig::in_memory();
    config.server.port = 0;
    config.auth.bcrypt_cost = 4;
    config.session.secret = SecretString::from("test-secret-key-for-testing-only-32chars".to_string());
    config
}
