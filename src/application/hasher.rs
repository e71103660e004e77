use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use async_trait::async_trait;

use crate::app_error::{AppError, AppResult};

/// One-way hashing for passwords and refresh tokens.
#[async_trait]
pub trait CredentialHasher: Send + Sync {
    /// Produces a salted hash. Hashing the same input twice yields different output.
    async fn hash(&self, plaintext: &str) -> AppResult<String>;

    /// Returns `Ok(false)` on any mismatch, including a stored hash that cannot be parsed.
    async fn verify(&self, hash: &str, plaintext: &str) -> AppResult<bool>;
}

/// Argon2id hasher. Work is moved onto the blocking pool so request tasks
/// are not stalled while the memory-hard function runs.
#[derive(Clone, Default)]
pub struct Argon2Hasher {
    argon2: Argon2<'static>,
}

impl Argon2Hasher {
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> AppResult<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| AppError::Internal(format!("Invalid Argon2 parameters: {e}")))?;
        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }
}

#[async_trait]
impl CredentialHasher for Argon2Hasher {
    async fn hash(&self, plaintext: &str) -> AppResult<String> {
        let argon2 = self.argon2.clone();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let salt = SaltString::generate(&mut OsRng);
            argon2
                .hash_password(plaintext.as_bytes(), &salt)
                .map(|hash| hash.to_string())
                .map_err(|e| AppError::Internal(format!("Hashing failed: {e}")))
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))?
    }

    async fn verify(&self, hash: &str, plaintext: &str) -> AppResult<bool> {
        let argon2 = self.argon2.clone();
        let hash = hash.to_owned();
        let plaintext = plaintext.to_owned();
        tokio::task::spawn_blocking(move || {
            let parsed = match PasswordHash::new(&hash) {
                Ok(parsed) => parsed,
                Err(err) => {
                    tracing::warn!(error = %err, "Stored hash is not a valid PHC string");
                    return false;
                }
            };
            argon2.verify_password(plaintext.as_bytes(), &parsed).is_ok()
        })
        .await
        .map_err(|e| AppError::Internal(e.to_string()))
    }
}
