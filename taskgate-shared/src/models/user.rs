/// User model and credential store
///
/// This module owns the `users` table: registration (hash then insert),
/// lookups for login and authorization, the admin listing and deletion.
/// Users are never updated in place.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id INTEGER PRIMARY KEY AUTOINCREMENT,
///     name TEXT NOT NULL,
///     email TEXT NOT NULL,
///     password_hash TEXT NOT NULL,
///     role TEXT NOT NULL DEFAULT 'user' CHECK (role IN ('user', 'admin')),
///     CONSTRAINT users_email_key UNIQUE (email)
/// );
/// ```
///
/// Emails are compared exactly as stored: `A@x.com` and `a@x.com` are two
/// different accounts.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::auth::password::{Hasher, PasswordError};

/// Account role
///
/// `Admin` satisfies every role requirement; `User` only its own.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular account, may only touch its own tasks
    #[default]
    User,
    /// Administrator, may manage users and every task
    Admin,
}

impl Role {
    /// Returns the role as a string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }

    /// Checks whether this role meets `required`
    ///
    /// # Example
    ///
    /// ```
    /// use taskgate_shared::models::user::Role;
    ///
    /// assert!(Role::Admin.satisfies(Role::User));
    /// assert!(!Role::User.satisfies(Role::Admin));
    /// ```
    pub fn satisfies(&self, required: Role) -> bool {
        match required {
            Role::User => true,
            Role::Admin => *self == Role::Admin,
        }
    }

    /// Resolves the role requested at registration
    ///
    /// Absent or unrecognized values fall back to `User`. Matching is exact,
    /// so `"Admin"` is not an admin request.
    pub fn from_requested(requested: Option<&str>) -> Self {
        match requested {
            Some("admin") => Role::Admin,
            _ => Role::User,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored user record
///
/// The password hash is loaded for login verification but never serialized.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Store-assigned id, stable for the lifetime of the account
    pub id: i64,

    /// Display name
    pub name: String,

    /// Unique login email, case-sensitive
    pub email: String,

    /// Argon2id PHC string
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Account role
    pub role: Role,
}

/// User fields safe to return to clients
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct PublicUser {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
        }
    }
}

/// Registration input
///
/// Carries the plaintext password only as far as [`User::register`].
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: Role,
}

impl std::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewUser")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"[redacted]")
            .field("role", &self.role)
            .finish()
    }
}

/// Credential store errors
#[derive(Debug, thiserror::Error)]
pub enum UserError {
    /// Another account already uses this email
    #[error("Email already exists")]
    DuplicateEmail,

    /// Password could not be hashed
    #[error(transparent)]
    Hash(#[from] PasswordError),

    /// Underlying database failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl User {
    /// Registers a new account
    ///
    /// The password is hashed on the blocking pool, then the row is written
    /// with a single insert. Uniqueness is left to the `users_email_key`
    /// constraint, so two concurrent registrations for one email cannot both
    /// succeed.
    ///
    /// # Errors
    ///
    /// - `UserError::DuplicateEmail` if the email is taken (no row is written)
    /// - `UserError::Hash` if hashing fails
    /// - `UserError::Database` for any other storage failure
    ///
    /// # Example
    ///
    /// ```no_run
    /// # use taskgate_shared::auth::password::Hasher;
    /// # use taskgate_shared::models::user::{NewUser, Role, User, UserError};
    /// # use sqlx::SqlitePool;
    /// # async fn example(pool: SqlitePool, hasher: Hasher) -> Result<(), UserError> {
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
    /// println!("Registered user {}", user.id);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn register(
        pool: &SqlitePool,
        hasher: &Hasher,
        data: NewUser,
    ) -> Result<Self, UserError> {
        let password_hash = hasher.hash_blocking(data.password).await?;

        let result = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (name, email, password_hash, role)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, email, password_hash, role
            "#,
        )
        .bind(data.name)
        .bind(data.email)
        .bind(password_hash)
        .bind(data.role)
        .fetch_one(pool)
        .await;

        match result {
            Ok(user) => {
                debug!(user_id = user.id, role = %user.role, "User registered");
                Ok(user)
            }
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                debug!("Registration rejected: email already exists");
                Err(UserError::DuplicateEmail)
            }
            Err(e) => Err(UserError::Database(e)),
        }
    }

    /// Finds a user by ID
    ///
    /// # Returns
    ///
    /// The user if found, None otherwise
    pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by exact email
    pub async fn find_by_email(pool: &SqlitePool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, name, email, password_hash, role
            FROM users
            WHERE email = ?
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Lists every account, oldest first, without password hashes
    pub async fn list_all(pool: &SqlitePool) -> Result<Vec<PublicUser>, sqlx::Error> {
        let users = sqlx::query_as::<_, PublicUser>(
            r#"
            SELECT id, name, email, role
            FROM users
            ORDER BY id ASC
            "#,
        )
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Deletes a user by ID
    ///
    /// Tasks owned by the user are removed with it (`ON DELETE CASCADE`).
    /// Tokens already issued to the user stay valid until they expire.
    ///
    /// # Returns
    ///
    /// True if user was deleted, false if user didn't exist
    pub async fn delete(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
