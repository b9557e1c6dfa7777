/// User administration endpoints (admin only)
///
/// - `GET /api/v1/users` - List all users
/// - `DELETE /api/v1/users/:id` - Delete a user and their tasks

use crate::{
    app::AppState,
    error::{ApiError, ApiResult},
};
use axum::{
    extract::{rejection::PathRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use taskgate_shared::auth::{authorization::require_role, middleware::AuthContext};
use taskgate_shared::models::user::{PublicUser, Role, User};
use tracing::info;

use super::tasks::MessageResponse;

/// User list response
#[derive(Debug, Serialize, Deserialize)]
pub struct UsersResponse {
    pub users: Vec<PublicUser>,
}

/// Lists all users
///
/// # Errors
///
/// - `401 Unauthorized`: no valid token
/// - `403 Forbidden`: caller is not an admin
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthContext,
) -> ApiResult<Json<UsersResponse>> {
    require_role(&auth, Role::Admin)?;

    let users = User::list_all(&state.db).await?;

    Ok(Json(UsersResponse { users }))
}

/// Deletes a user
///
/// The user's tasks are deleted with them. Tokens already issued to the
/// user remain valid until they expire.
///
/// # Errors
///
/// - `401 Unauthorized`: no valid token
/// - `403 Forbidden`: caller is not an admin
/// - `404 Not Found`: no such user
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthContext,
    id: Result<Path<i64>, PathRejection>,
) -> ApiResult<Json<MessageResponse>> {
    require_role(&auth, Role::Admin)?;

    let Path(id) = id.map_err(|_| ApiError::NotFound("User not found".to_string()))?;

    if !User::delete(&state.db, id).await? {
        return Err(ApiError::NotFound("User not found".to_string()));
    }

    info!(admin_id = auth.user_id, user_id = id, "User deleted");

    Ok(Json(MessageResponse::new("User deleted successfully")))
}
