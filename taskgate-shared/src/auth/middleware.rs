/// Request authentication for Axum
///
/// This module turns the `Authorization` header into an [`AuthContext`]. It
/// is the first link of the access chain; role and ownership checks live in
/// [`super::authorization`].
///
/// # Accepted Header Forms
///
/// - `Authorization: Bearer <token>` (scheme matched case-insensitively)
/// - `Authorization: <token>`
///
/// Every failure produces the same 401 response, whatever the cause.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use axum::{extract::FromRef, routing::get, Router};
/// use taskgate_shared::auth::jwt::TokenService;
/// use taskgate_shared::auth::middleware::AuthContext;
///
/// #[derive(Clone)]
/// struct State {
///     tokens: Arc<TokenService>,
/// }
///
/// impl FromRef<State> for Arc<TokenService> {
///     fn from_ref(state: &State) -> Self {
///         state.tokens.clone()
///     }
/// }
///
/// async fn protected_handler(auth: AuthContext) -> String {
///     format!("Hello, user {}!", auth.user_id)
/// }
///
/// # fn build(tokens: Arc<TokenService>) -> Router {
/// Router::new()
///     .route("/protected", get(protected_handler))
///     .with_state(State { tokens })
/// # }
/// ```

use std::sync::Arc;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, warn};

use super::jwt::{Claims, JwtError, TokenService};
use crate::models::user::Role;

/// Message returned for every authentication failure
pub const UNAUTHENTICATED_MESSAGE: &str = "Invalid or missing authentication token";

/// Identity of the caller for one request
///
/// Built from verified token claims; never from anything else the client
/// sends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: i64,

    /// Role carried by the token
    pub role: Role,
}

impl AuthContext {
    /// Creates auth context from verified claims
    pub fn from_claims(claims: &Claims) -> Result<Self, JwtError> {
        Ok(Self {
            user_id: claims.user_id()?,
            role: claims.role,
        })
    }

    /// Whether the caller is an administrator
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Error type for request authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing or empty authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Token verification failed
    #[error("Invalid token")]
    InvalidToken(#[from] JwtError),
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": "unauthorized",
            "message": UNAUTHENTICATED_MESSAGE,
        });

        (StatusCode::UNAUTHORIZED, Json(body)).into_response()
    }
}

/// Extracts the token from an `Authorization` header value
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::middleware::extract_token;
///
/// assert_eq!(extract_token("Bearer abc"), Some("abc"));
/// assert_eq!(extract_token("bearer abc"), Some("abc"));
/// assert_eq!(extract_token("abc"), Some("abc"));
/// assert_eq!(extract_token("Bearer "), None);
/// assert_eq!(extract_token(""), None);
/// ```
pub fn extract_token(value: &str) -> Option<&str> {
    let value = value.trim();

    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };

    if token.is_empty() {
        None
    } else {
        Some(token)
    }
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `AuthError::MissingCredentials` when no usable header is present
/// - `AuthError::InvalidToken` when the token fails verification
pub fn authenticate(headers: &HeaderMap, tokens: &TokenService) -> Result<AuthContext, AuthError> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(extract_token)
        .ok_or_else(|| {
            debug!("Request without credentials");
            AuthError::MissingCredentials
        })?;

    let claims = tokens.verify(token).map_err(|e| {
        warn!(reason = %e, "Rejected session token");
        AuthError::InvalidToken(e)
    })?;

    Ok(AuthContext::from_claims(&claims)?)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
    Arc<TokenService>: FromRef<S>,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        authenticate(&parts.headers, &tokens)
    }
}
