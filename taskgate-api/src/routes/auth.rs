/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /api/v1/register` - Register new user
/// - `POST /api/v1/login` - Verify credentials and get a session token

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
    routes::{required, validation_details},
};
use axum::{extract::rejection::JsonRejection, extract::State, http::StatusCode, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskgate_shared::models::user::{NewUser, PublicUser, Role, User};
use tracing::{info, warn};
use validator::Validate;

const MISSING_FIELDS: &str = "Missing required fields";
const INVALID_CREDENTIALS: &str = "Invalid credentials";

/// Local part, `@`, dotted domain, alphabetic TLD of two or more letters
static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

/// Register request
///
/// Fields are optional at the JSON level so that absent fields produce the
/// same 400 as empty ones.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,

    /// Requested role; anything but the string "admin" registers a user,
    /// including non-string JSON values
    pub role: Option<Value>,
}

/// Registration fields after the presence check
#[derive(Validate)]
struct Registration {
    #[validate(regex(path = *EMAIL_RE, message = "Invalid email format"))]
    email: String,

    #[validate(length(min = 6, message = "Password must be at least 6 characters"))]
    password: String,
}

/// Register response
#[derive(Debug, Serialize, Deserialize)]
pub struct RegisterResponse {
    pub message: String,
    pub user_id: i64,
}

/// Login request
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Login response
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub message: String,

    /// Session token for the `Authorization` header
    pub token: String,

    pub user: PublicUser,
}

/// Register a new user
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/register
/// Content-Type: application/json
///
/// {
///   "name": "Ada",
///   "email": "ada@example.com",
///   "password": "hunter22",
///   "role": "user"
/// }
/// ```
///
/// # Response
///
/// `201 Created` with `{ "message": "User registered successfully", "user_id": 1 }`
///
/// # Errors
///
/// - `400 Bad Request`: missing fields, invalid email, short password,
///   malformed JSON, or email already registered
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RegisterResponse>)> {
    let Json(req) = payload?;

    let (Some(name), Some(email), Some(password)) =
        (required(req.name), required(req.email), required(req.password))
    else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let registration = Registration { email, password };
    registration
        .validate()
        .map_err(|e| ApiError::ValidationError(validation_details(&e)))?;

    let role = Role::from_requested(req.role.as_ref().and_then(Value::as_str));

    let user = User::register(
        &state.db,
        &state.hasher,
        NewUser {
            name,
            email: registration.email,
            password: registration.password,
            role,
        },
    )
    .await?;

    info!(user_id = user.id, role = %user.role, "User registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully".to_string(),
            user_id: user.id,
        }),
    ))
}

/// Login
///
/// Unknown email and wrong password produce the same response.
///
/// # Endpoint
///
/// ```text
/// POST /api/v1/login
/// Content-Type: application/json
///
/// { "email": "ada@example.com", "password": "hunter22" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "message": "Login successful",
///   "token": "eyJ...",
///   "user": { "id": 1, "name": "Ada", "email": "ada@example.com", "role": "user" }
/// }
/// ```
///
/// # Errors
///
/// - `400 Bad Request`: missing fields or malformed JSON
/// - `401 Unauthorized`: invalid credentials
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> ApiResult<Json<LoginResponse>> {
    let Json(req) = payload?;

    let (Some(email), Some(password)) = (required(req.email), required(req.password)) else {
        return Err(ApiError::BadRequest(MISSING_FIELDS.to_string()));
    };

    let Some(user) = User::find_by_email(&state.db, &email).await? else {
        // Same Argon2 cost as a wrong password
        state.hasher.verify_decoy_blocking(password).await;
        warn!("Login failed: unknown email");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    };

    if !state
        .hasher
        .verify_blocking(password, user.password_hash.clone())
        .await
    {
        warn!(user_id = user.id, "Login failed: wrong password");
        return Err(ApiError::Unauthorized(INVALID_CREDENTIALS.to_string()));
    }

    let token = state.tokens.issue(user.id, user.role)?;

    info!(user_id = user.id, "User logged in");

    Ok(Json(LoginResponse {
        message: "Login successful".to_string(),
        token,
        user: user.into(),
    }))
}
