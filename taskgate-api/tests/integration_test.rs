/// Integration tests for the TaskGate API
///
/// These drive the real router end to end:
/// - Registration and login
/// - Token handling (bearer, bare, expired, tampered)
/// - Role checks on user administration
/// - Ownership checks on tasks

mod common;

use axum::http::{Method, StatusCode};
use chrono::Duration;
use common::{TestContext, PASSWORD, TEST_SECRET};
use serde_json::json;
use taskgate_shared::auth::jwt::{Claims, TokenService};
use taskgate_shared::auth::middleware::UNAUTHENTICATED_MESSAGE;
use taskgate_shared::models::user::Role;

#[tokio::test]
async fn test_end_to_end_flow() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({ "name": "Ann", "email": "a@x.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    let user_id = body["user_id"].as_i64().unwrap();

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Login successful");
    assert_eq!(body["user"]["id"], user_id);
    assert_eq!(body["user"]["name"], "Ann");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["role"], "user");
    assert!(body["user"].get("password_hash").is_none());
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "tasks": [] }));

    let (status, _) = ctx.send(Method::GET, "/api/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = ctx.send(Method::GET, "/api/v1/users", Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_ownership_flow() {
    let ctx = TestContext::new().await.unwrap();

    let (_, token_a) = ctx.register_and_login("A", "a@example.com", "user").await;
    let (b_id, token_b) = ctx.register_and_login("B", "b@example.com", "user").await;
    let (_, admin_token) = ctx.register_and_login("Root", "root@example.com", "admin").await;

    let task_id = ctx.create_task(&token_b, "B's task").await;
    let uri = format!("/api/v1/tasks/{}", task_id);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&token_a), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    // Still there for its owner
    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&token_b), None).await;
    assert_eq!(body["tasks"][0]["id"], task_id);
    assert_eq!(body["tasks"][0]["user_id"], b_id);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task deleted successfully");

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_task_listing_scoped_by_role() {
    let ctx = TestContext::new().await.unwrap();

    let (_, token_a) = ctx.register_and_login("A", "a@example.com", "user").await;
    let (_, token_b) = ctx.register_and_login("B", "b@example.com", "user").await;
    let (_, admin_token) = ctx.register_and_login("Root", "root@example.com", "admin").await;

    ctx.create_task(&token_a, "A1").await;
    ctx.create_task(&token_b, "B1").await;
    ctx.create_task(&token_a, "A2").await;

    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&token_a), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 2);

    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&token_b), None).await;
    let tasks = body["tasks"].as_array().unwrap();
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0]["title"], "B1");
    assert_eq!(tasks[0]["description"], "details");

    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&admin_token), None).await;
    assert_eq!(body["tasks"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_bare_token_accepted() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_and_login("A", "a@example.com", "user").await;

    let (status, _) = ctx
        .send_raw(Method::GET, "/api/v1/tasks", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = ctx
        .send_raw(Method::GET, "/api/v1/tasks", Some(&format!("bearer {}", token)), None)
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invalid_tokens_uniformly_rejected() {
    let ctx = TestContext::new().await.unwrap();
    let (user_id, token) = ctx.register_and_login("A", "a@example.com", "user").await;

    let expired = TokenService::new(TEST_SECRET, Duration::hours(1))
        .sign(&Claims::with_expiration(user_id, Role::User, Duration::seconds(-3600)))
        .unwrap();

    let sig_start = token.rfind('.').unwrap() + 1;
    let replacement = if token.as_bytes()[sig_start] == b'A' { "B" } else { "A" };
    let mut tampered = token.clone();
    tampered.replace_range(sig_start..sig_start + 1, replacement);

    let foreign = TokenService::new("some-other-secret-that-is-32-bytes-long", Duration::hours(1))
        .issue(user_id, Role::Admin)
        .unwrap();

    let mut bodies = Vec::new();
    for bad in [expired.as_str(), tampered.as_str(), foreign.as_str(), "garbage"] {
        let (status, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(bad), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        bodies.push(body);
    }

    let (status, body) = ctx.send(Method::GET, "/api/v1/tasks", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    bodies.push(body);

    for body in &bodies {
        assert_eq!(body["error"], "unauthorized");
        assert_eq!(body["message"], UNAUTHENTICATED_MESSAGE);
    }
}

#[tokio::test]
async fn test_token_carries_configured_ttl() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_and_login("A", "a@example.com", "user").await;

    let claims = TokenService::new(TEST_SECRET, ctx.config.jwt.token_ttl())
        .verify(&token)
        .unwrap();
    assert_eq!(claims.exp - claims.iat, ctx.config.jwt.token_ttl().num_seconds());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register("A", "dup@example.com", "user").await;

    let (status, body) = ctx
        .send(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({ "name": "B", "email": "dup@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "conflict");
    assert_eq!(body["message"], "Email already exists");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&ctx.db)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_register_email_case_sensitive() {
    let ctx = TestContext::new().await.unwrap();

    let upper = ctx.register("Upper", "A@x.com", "user").await;
    let lower = ctx.register("Lower", "a@x.com", "user").await;
    assert_ne!(upper, lower);
}

#[tokio::test]
async fn test_register_unknown_role_coerced_to_user() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register("Sneaky", "sneaky@example.com", "superuser").await;

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "email": "sneaky@example.com", "password": PASSWORD })),
        )
        .await;
    assert_eq!(body["user"]["role"], "user");

    let token = body["token"].as_str().unwrap();
    let (status, _) = ctx.send(Method::GET, "/api/v1/users", Some(token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_register_non_string_role_coerced_to_user() {
    let ctx = TestContext::new().await.unwrap();

    let roles = [json!(1), json!(true), json!(["admin"]), json!({ "x": 1 }), json!(null)];
    for (i, role) in roles.into_iter().enumerate() {
        let email = format!("odd{}@example.com", i);
        let (status, body) = ctx
            .send(
                Method::POST,
                "/api/v1/register",
                None,
                Some(json!({ "name": "Odd", "email": email, "password": PASSWORD, "role": role })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "role {} gave {}", role, body);

        let (_, body) = ctx
            .send(
                Method::POST,
                "/api/v1/login",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(body["user"]["role"], "user");
    }
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new().await.unwrap();

    let cases = [
        json!({ "email": "a@example.com", "password": PASSWORD }),
        json!({ "name": "", "email": "a@example.com", "password": PASSWORD }),
        json!({ "name": "A", "password": PASSWORD }),
        json!({ "name": "A", "email": "a@example.com" }),
        json!({ "name": "A", "email": "not-an-email", "password": PASSWORD }),
        json!({ "name": "A", "email": "a@localhost", "password": PASSWORD }),
        json!({ "name": "A", "email": "a@x.c", "password": PASSWORD }),
        json!({ "name": "A", "email": "a@example.com", "password": "12345" }),
    ];

    for case in cases {
        let (status, body) = ctx
            .send(Method::POST, "/api/v1/register", None, Some(case.clone()))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "case {} gave {}", case, body);
    }

    let (_, body) = ctx
        .send(
            Method::POST,
            "/api/v1/register",
            None,
            Some(json!({ "name": "A", "email": "a@example.com", "password": "12345" })),
        )
        .await;
    assert_eq!(body["error"], "validation_error");
    assert_eq!(body["details"][0]["field"], "password");

    let (status, body) = ctx
        .send_raw(Method::POST, "/api/v1/register", None, Some("{not json".to_string()))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "bad_request");
}

#[tokio::test]
async fn test_login_failures_indistinguishable() {
    let ctx = TestContext::new().await.unwrap();
    ctx.register("A", "a@example.com", "user").await;

    let (wrong_status, wrong_body) = ctx
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "email": "a@example.com", "password": "wrong-password" })),
        )
        .await;
    let (unknown_status, unknown_body) = ctx
        .send(
            Method::POST,
            "/api/v1/login",
            None,
            Some(json!({ "email": "nobody@example.com", "password": PASSWORD })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body, unknown_body);
    assert_eq!(wrong_body["message"], "Invalid credentials");

    let (status, _) = ctx
        .send(Method::POST, "/api/v1/login", None, Some(json!({ "email": "a@example.com" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_user_management() {
    let ctx = TestContext::new().await.unwrap();

    let (_, admin_token) = ctx.register_and_login("Root", "root@example.com", "admin").await;
    let (victim_id, victim_token) = ctx.register_and_login("V", "v@example.com", "user").await;
    ctx.create_task(&victim_token, "Doomed").await;

    let (status, body) = ctx.send(Method::GET, "/api/v1/users", Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let users = body["users"].as_array().unwrap();
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|u| u.get("password_hash").is_none()));

    let uri = format!("/api/v1/users/{}", victim_id);

    let (status, _) = ctx.send(Method::DELETE, &uri, Some(&victim_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "User deleted successfully");

    let (status, body) = ctx.send(Method::DELETE, &uri, Some(&admin_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "User not found");

    // Their tasks went with them
    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&admin_token), None).await;
    assert_eq!(body["tasks"], json!([]));
}

#[tokio::test]
async fn test_update_task_checks_in_order() {
    let ctx = TestContext::new().await.unwrap();

    let (_, owner_token) = ctx.register_and_login("O", "o@example.com", "user").await;
    let (_, other_token) = ctx.register_and_login("X", "x@example.com", "user").await;
    let task_id = ctx.create_task(&owner_token, "Original").await;
    let uri = format!("/api/v1/tasks/{}", task_id);

    // Missing task wins over everything else
    let (status, _) = ctx
        .send(Method::PUT, "/api/v1/tasks/9999", Some(&other_token), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // Ownership is checked before the body
    let (status, _) = ctx
        .send(Method::PUT, &uri, Some(&other_token), Some(json!({ "title": "" })))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(&owner_token), Some(json!({ "title": "   " })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title cannot be empty");

    let (status, _) = ctx
        .send(Method::PUT, &uri, Some(&owner_token), Some(json!({ "title": "x".repeat(201) })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(&owner_token), Some(json!({ "description": "new details" })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Task updated successfully");

    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&owner_token), None).await;
    assert_eq!(body["tasks"][0]["title"], "Original");
    assert_eq!(body["tasks"][0]["description"], "new details");
}

#[tokio::test]
async fn test_update_task_body_rules() {
    let ctx = TestContext::new().await.unwrap();

    let (_, token) = ctx.register_and_login("O", "o@example.com", "user").await;
    let task_id = ctx.create_task(&token, "Keep me").await;
    let uri = format!("/api/v1/tasks/{}", task_id);

    let (status, body) = ctx.send(Method::PUT, &uri, Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No data provided");

    let (status, body) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "title": null })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title cannot be empty");

    let (status, _) = ctx
        .send(Method::PUT, &uri, Some(&token), Some(json!({ "description": null })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = ctx.send(Method::GET, "/api/v1/tasks", Some(&token), None).await;
    assert_eq!(body["tasks"][0]["title"], "Keep me");
    assert_eq!(body["tasks"][0]["description"], "");

    let (status, body) = ctx.send(Method::POST, "/api/v1/tasks", Some(&token), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "No data provided");
}

#[tokio::test]
async fn test_create_task_validation() {
    let ctx = TestContext::new().await.unwrap();
    let (_, token) = ctx.register_and_login("A", "a@example.com", "user").await;

    let (status, body) = ctx
        .send(Method::POST, "/api/v1/tasks", Some(&token), Some(json!({ "description": "no title" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Title cannot be empty");

    let (status, _) = ctx
        .send(Method::POST, "/api/v1/tasks", Some(&token), Some(json!({ "title": "y".repeat(201) })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = ctx
        .send(Method::POST, "/api/v1/tasks", Some(&token), Some(json!({ "title": "Only title" })))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Task created successfully");
}

#[tokio::test]
async fn test_unknown_route_and_health() {
    let ctx = TestContext::new().await.unwrap();

    let (status, body) = ctx.send(Method::GET, "/api/v1/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");
    assert_eq!(body["message"], "Endpoint not found");

    let (status, body) = ctx.send(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["database"], "connected");
}
