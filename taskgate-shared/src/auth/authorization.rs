/// Authorization helpers and permission checks
///
/// Role and ownership checks applied after [`super::middleware::authenticate`]
/// has produced an [`AuthContext`]. Both are pure functions of the context
/// and keep no state between requests.
///
/// # Permission Model
///
/// 1. **Role**: `Admin` satisfies every requirement, `User` only `User`
/// 2. **Ownership**: a resource may be changed by its owner or by an admin
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::authorization::{require_ownership, require_role};
/// use taskgate_shared::auth::middleware::AuthContext;
/// use taskgate_shared::models::user::Role;
///
/// let auth = AuthContext { user_id: 3, role: Role::User };
///
/// assert!(require_role(&auth, Role::User).is_ok());
/// assert!(require_role(&auth, Role::Admin).is_err());
/// assert!(require_ownership(&auth, 3).is_ok());
/// assert!(require_ownership(&auth, 4).is_err());
/// ```

use tracing::warn;

use super::middleware::AuthContext;
use crate::models::user::Role;

/// Error type for authorization checks
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AuthzError {
    /// User doesn't have required role
    #[error("Insufficient permissions: requires {required}, has {actual}")]
    InsufficientRole { required: Role, actual: Role },

    /// User is neither the owner nor an admin
    #[error("Not the owner of this resource")]
    NotOwner,
}

/// Requires the caller's role to satisfy `required`
pub fn require_role(auth: &AuthContext, required: Role) -> Result<(), AuthzError> {
    if auth.role.satisfies(required) {
        Ok(())
    } else {
        warn!(
            user_id = auth.user_id,
            required = %required,
            actual = %auth.role,
            "Role requirement not met"
        );
        Err(AuthzError::InsufficientRole {
            required,
            actual: auth.role,
        })
    }
}

/// Requires the caller to own the resource or be an admin
pub fn require_ownership(auth: &AuthContext, resource_owner_id: i64) -> Result<(), AuthzError> {
    if auth.is_admin() || auth.user_id == resource_owner_id {
        Ok(())
    } else {
        warn!(
            user_id = auth.user_id,
            owner_id = resource_owner_id,
            "Ownership requirement not met"
        );
        Err(AuthzError::NotOwner)
    }
}
