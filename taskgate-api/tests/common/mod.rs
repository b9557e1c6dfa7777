/// Common test utilities for integration tests
///
/// Every `TestContext` owns a fresh in-memory database with migrations
/// applied, and a router built exactly as `main` builds it. Argon2 costs are
/// lowered so tests stay fast.

use std::collections::HashMap;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use taskgate_api::app::{build_router, AppState};
use taskgate_api::config::Config;
use taskgate_shared::db::{migrations::run_migrations, pool::create_pool};
use tower::ServiceExt;

pub const TEST_SECRET: &str = "integration-test-secret-at-least-32-bytes";
pub const PASSWORD: &str = "password123";

/// Test context containing all necessary resources
pub struct TestContext {
    pub db: SqlitePool,
    pub app: axum::Router,
    pub config: Config,
}

impl TestContext {
    /// Creates a new test context with a fresh database
    pub async fn new() -> anyhow::Result<Self> {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("JWT_SECRET", TEST_SECRET),
            ("DATABASE_URL", "sqlite::memory:"),
            ("PASSWORD_HASH_MEMORY_KIB", "1024"),
            ("PASSWORD_HASH_ITERATIONS", "1"),
            ("PASSWORD_HASH_PARALLELISM", "1"),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).map(|v| v.to_string()))?;

        let db = create_pool(config.database.pool_config()).await?;
        run_migrations(&db).await?;

        let state = AppState::new(db.clone(), config.clone())?;
        let app = build_router(state);

        Ok(TestContext { db, app, config })
    }

    /// Sends a request and returns the status and JSON body
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let raw = body.map(|b| b.to_string());
        self.send_raw(method, uri, token.map(auth_header).as_deref(), raw).await
    }

    /// Sends a request with a literal `Authorization` value and body
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        authorization: Option<&str>,
        body: Option<String>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(value) = authorization {
            builder = builder.header(header::AUTHORIZATION, value);
        }

        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                panic!("Non-JSON body ({}): {}", status, String::from_utf8_lossy(&bytes))
            })
        };

        (status, json)
    }

    /// Registers a user and returns their id
    pub async fn register(&self, name: &str, email: &str, role: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({
                    "name": name,
                    "email": email,
                    "password": PASSWORD,
                    "role": role,
                })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        body["user_id"].as_i64().expect("user_id should be an integer")
    }

    /// Logs in and returns the session token
    pub async fn login(&self, email: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;

        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body["token"].as_str().expect("token should be a string").to_string()
    }

    /// Registers then logs in, returning (user id, token)
    pub async fn register_and_login(&self, name: &str, email: &str, role: &str) -> (i64, String) {
        let id = self.register(name, email, role).await;
        let token = self.login(email).await;
        (id, token)
    }

    /// Creates a task as the token's owner and returns its id
    pub async fn create_task(&self, token: &str, title: &str) -> i64 {
        let (status, body) = self
            .send(
                Method::POST,
                "/api/v1/tasks",
                Some(token),
                Some(json!({ "title": title, "description": "details" })),
            )
            .await;

        assert_eq!(status, StatusCode::CREATED, "create task failed: {}", body);
        body["task_id"].as_i64().expect("task_id should be an integer")
    }
}

/// Returns authorization header value
pub fn auth_header(token: &str) -> String {
    format!("Bearer {}", token)
}
