/// Password hashing module using Argon2id
///
/// Passwords are hashed with Argon2id, a deliberately slow, memory-hard
/// algorithm. Cost parameters come from [`HashingConfig`], which is built once
/// from the process configuration and handed to [`Hasher::new`].
///
/// # Security
///
/// - **Algorithm**: Argon2id, version 0x13
/// - **Salt**: 16 random bytes from the OS RNG, fresh for every hash
/// - **Output**: PHC string embedding algorithm, parameters, salt and hash
/// - **Verification**: constant-time comparison inside `argon2`
///
/// # Example
///
/// ```
/// use taskgate_shared::auth::password::{Hasher, HashingConfig};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hasher = Hasher::new(HashingConfig::default())?;
/// let hash = hasher.hash("super_secret_password_123")?;
///
/// assert!(hasher.verify("super_secret_password_123", &hash));
/// assert!(!hasher.verify("wrong_password", &hash));
/// # Ok(())
/// # }
/// ```

use std::sync::Arc;

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, Params, ParamsBuilder, Version,
};
use tracing::{error, warn};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Cost parameters rejected by argon2
    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// The blocking hashing task did not complete
    #[error("Hashing task failed: {0}")]
    TaskFailed(String),
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HashingConfig {
    /// Memory cost in KiB
    pub memory_kib: u32,

    /// Number of passes
    pub iterations: u32,

    /// Degree of parallelism (lanes)
    pub parallelism: u32,
}

impl Default for HashingConfig {
    /// 64 MB, 3 passes, 4 lanes
    fn default() -> Self {
        Self {
            memory_kib: 65536,
            iterations: 3,
            parallelism: 4,
        }
    }
}

/// Fixed input for the decoy hash built by [`Hasher::new`]
const DECOY_PASSWORD: &str = "taskgate-decoy-password";

/// Salted one-way password hasher
///
/// Cheap to clone; holds the validated parameters and a decoy hash made
/// with them, used to spend the same work on logins for unknown accounts.
#[derive(Debug, Clone)]
pub struct Hasher {
    params: Params,
    decoy: Arc<str>,
}

impl Hasher {
    /// Creates a hasher, validating the cost parameters
    ///
    /// # Errors
    ///
    /// Returns `PasswordError::InvalidParams` if argon2 rejects the
    /// combination (e.g. memory below 8 KiB per lane), or
    /// `PasswordError::HashError` if the decoy hash cannot be built.
    pub fn new(config: HashingConfig) -> Result<Self, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(config.memory_kib)
            .t_cost(config.iterations)
            .p_cost(config.parallelism)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::InvalidParams(e.to_string()))?;

        let mut hasher = Self {
            params,
            decoy: Arc::from(""),
        };
        hasher.decoy = Arc::from(hasher.hash(DECOY_PASSWORD)?);

        Ok(hasher)
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Hashes a password with a fresh random salt
    ///
    /// Two calls with the same password return different strings.
    ///
    /// # Example
    ///
    /// ```
    /// use taskgate_shared::auth::password::{Hasher, HashingConfig};
    ///
    /// # fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let hasher = Hasher::new(HashingConfig::default())?;
    /// let hash = hasher.hash("my_password")?;
    /// assert!(hash.starts_with("$argon2id$"));
    /// # Ok(())
    /// # }
    /// ```
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        let password_hash = self
            .argon2()
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| PasswordError::HashError(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    /// Verifies a password against a stored hash
    ///
    /// Salt and parameters are read from the hash itself, so hashes created
    /// under older cost settings keep verifying. A malformed hash yields
    /// `false` rather than an error.
    pub fn verify(&self, password: &str, hash: &str) -> bool {
        let parsed_hash = match PasswordHash::new(hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!(error = %e, "Stored password hash could not be parsed");
                return false;
            }
        };

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => true,
            Err(argon2::password_hash::Error::Password) => false,
            Err(e) => {
                warn!(error = %e, "Password verification failed");
                false
            }
        }
    }

    /// Hashes on tokio's blocking pool
    pub async fn hash_blocking(&self, password: String) -> Result<String, PasswordError> {
        let hasher = self.clone();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
    }

    /// Verifies on tokio's blocking pool
    pub async fn verify_blocking(&self, password: String, hash: String) -> bool {
        let hasher = self.clone();
        match tokio::task::spawn_blocking(move || hasher.verify(&password, &hash)).await {
            Ok(valid) => valid,
            Err(e) => {
                error!(error = %e, "Password verification task failed");
                false
            }
        }
    }

    /// Runs a full verification against the decoy hash and reports failure
    ///
    /// For login attempts with no matching account, so they cost as much as
    /// a wrong password.
    pub async fn verify_decoy_blocking(&self, password: String) -> bool {
        self.verify_blocking(password, self.decoy.to_string()).await;
        false
    }
}
