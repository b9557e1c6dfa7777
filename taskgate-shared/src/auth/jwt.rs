/// Session token issuance and verification
///
/// Tokens are HS256 JWTs carrying the user id and role. They are not stored
/// anywhere: a token is valid exactly when its signature verifies under the
/// process secret, its issuer is `taskgate`, and the current time is strictly
/// before `exp`.
///
/// # Security
///
/// - **Algorithm**: HS256 (HMAC with SHA-256)
/// - **Expiration**: fixed TTL per [`TokenService`], no leeway
/// - **Secret Management**: loaded once at startup; never logged, never
///   included in an error
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::jwt::TokenService;
/// use taskgate_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("your-secret-key-at-least-32-bytes!", chrono::Duration::hours(24));
///
/// let token = tokens.issue(7, Role::Admin)?;
/// let claims = tokens.verify(&token)?;
///
/// assert_eq!(claims.user_id()?, 7);
/// assert_eq!(claims.role, Role::Admin);
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::user::Role;

/// Issuer claim written into and required on every token
pub const ISSUER: &str = "taskgate";

/// Error type for JWT operations
///
/// The variants exist for server-side diagnostics. Clients only ever learn
/// that authentication failed.
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Signature does not match the payload
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token was issued by someone else
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Invalid token format
    #[error("Invalid token format: {0}")]
    InvalidFormat(String),
}

/// JWT claims structure
///
/// - `sub`: user id, as a decimal string
/// - `role`: role at issuance time
/// - `iss`: always "taskgate"
/// - `iat` / `nbf` / `exp`: Unix timestamps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: String,

    /// Role of the user when the token was issued
    pub role: Role,

    /// Issuer - Always "taskgate"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl Claims {
    /// Creates claims that expire `expires_in` from now
    ///
    /// # Example
    ///
    /// ```
    /// use taskgate_shared::auth::jwt::Claims;
    /// use taskgate_shared::models::user::Role;
    /// use chrono::Duration;
    ///
    /// let claims = Claims::with_expiration(1, Role::User, Duration::hours(1));
    /// assert!(!claims.is_expired());
    /// ```
    pub fn with_expiration(user_id: i64, role: Role, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id.to_string(),
            role,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expiration.timestamp(),
        }
    }

    /// Parses the subject back into a user id
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidFormat("subject is not a user id".to_string()))
    }

    /// Checks if token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() >= self.exp
    }
}

/// Issues and verifies session tokens
///
/// Built once from configuration and shared behind an `Arc`. The key material
/// never leaves this struct; `Debug` prints it redacted.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service for `secret` with a fixed token lifetime
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.leeway = 0;

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    /// Token lifetime
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for a user, expiring after the configured TTL
    ///
    /// # Errors
    ///
    /// Returns `JwtError::CreateError` if signing fails
    pub fn issue(&self, user_id: i64, role: Role) -> Result<String, JwtError> {
        self.sign(&Claims::with_expiration(user_id, role, self.ttl))
    }

    /// Signs arbitrary claims with HS256
    pub fn sign(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding)
            .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
    }

    /// Verifies a token and returns its claims
    ///
    /// Checks the signature, issuer, `nbf`, and that `now < exp`. The subject
    /// must parse as a user id.
    ///
    /// # Errors
    ///
    /// - `JwtError::Expired` once `exp` is reached
    /// - `JwtError::InvalidSignature` if the token was altered or signed with
    ///   another key
    /// - `JwtError::InvalidIssuer` for a foreign issuer
    /// - `JwtError::InvalidFormat` for anything that is not a well-formed token
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let token_data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::Expired,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
                _ => JwtError::InvalidFormat(e.to_string()),
            }
        })?;

        let claims = token_data.claims;

        // The library accepts exp == now; the boundary second is already expired
        if claims.is_expired() {
            return Err(JwtError::Expired);
        }

        claims.user_id()?;

        Ok(claims)
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("key", &"[redacted]")
            .field("ttl_seconds", &self.ttl.num_seconds())
            .finish()
    }
}
