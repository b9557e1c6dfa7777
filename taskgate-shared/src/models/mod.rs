/// Database models for TaskGate
///
/// This module contains the database models and their CRUD operations.
///
/// # Models
///
/// - `user`: User accounts, roles and the credential store
/// - `task`: Tasks owned by users
///
/// # Example
///
/// ```no_run
/// use taskgate_shared::auth::password::{Hasher, HashingConfig};
/// use taskgate_shared::db::pool::{create_pool, DatabaseConfig};
/// use taskgate_shared::models::user::{NewUser, Role, User};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
/// let hasher = Hasher::new(HashingConfig::default())?;
///
/// let user = User::register(
///     &pool,
///     &hasher,
///     NewUser {
///         name: "Ada".to_string(),
///         email: "ada@example.com".to_string(),
///         password: "hunter22".to_string(),
///         role: Role::User,
///     },
/// )
/// .await?;
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;
