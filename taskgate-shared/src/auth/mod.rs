/// Authentication and authorization utilities
///
/// This module provides the security primitives for TaskGate:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token issuance and verification
/// - [`middleware`]: Request authentication (the `AuthContext` extractor)
/// - [`authorization`]: Role and ownership checks
///
/// # Request Pipeline
///
/// Every protected handler runs the same chain, stopping at the first failure:
///
/// 1. `authenticate` - a valid token must be present (401 otherwise)
/// 2. `require_role` - only for operations that declare a role (403)
/// 3. `require_ownership` - for operations on owned resources (403)
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::auth::jwt::TokenService;
/// use taskgate_shared::auth::password::{Hasher, HashingConfig};
/// use taskgate_shared::models::user::Role;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Hasher::new(HashingConfig::default())?;
/// let hash = hasher.hash("user_password")?;
/// assert!(hasher.verify("user_password", &hash));
///
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!", chrono::Duration::hours(24));
/// let token = tokens.issue(42, Role::User)?;
/// assert_eq!(tokens.verify(&token)?.user_id()?, 42);
/// # Ok(())
/// # }
/// ```

pub mod authorization;
pub mod jwt;
pub mod middleware;
pub mod password;
