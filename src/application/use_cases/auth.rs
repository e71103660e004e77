use std::sync::Arc;

use async_trait::async_trait;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::{hasher::CredentialHasher, jwt::TokenIssuer},
    domain::entities::{token_pair::TokenPair, user::User},
};

// ============================================================================
// Ports
// ============================================================================

/// Persistence for users. Implementations must report an email uniqueness
/// violation from `create` as `AppError::DuplicateEmail`.
#[async_trait]
pub trait UserRepo: Send + Sync {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Sets or clears the refresh-token hash. Unknown ids are a no-op.
    async fn update_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> AppResult<()>;

    /// Replaces the refresh-token hash only if it still equals `expected`.
    /// Returns whether the swap happened.
    async fn swap_refresh_hash(&self, id: Uuid, expected: &str, replacement: &str)
    -> AppResult<bool>;
}

/// Liveness probe for whatever backs the `UserRepo`.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    fn name(&self) -> &'static str;

    async fn ping(&self) -> AppResult<()>;
}

// ============================================================================
// Use Cases
// ============================================================================

#[derive(Clone)]
pub struct AuthUseCases {
    repo: Arc<dyn UserRepo>,
    hasher: Arc<dyn CredentialHasher>,
    tokens: Arc<TokenIssuer>,
}

impl AuthUseCases {
    pub fn new(
        repo: Arc<dyn UserRepo>,
        hasher: Arc<dyn CredentialHasher>,
        tokens: Arc<TokenIssuer>,
    ) -> Self {
        Self {
            repo,
            hasher,
            tokens,
        }
    }

    #[instrument(skip(self, password))]
    pub async fn register(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let password_hash = self.hasher.hash(password).await?;

        let user = match self.repo.create(email, &password_hash).await {
            Ok(user) => user,
            Err(AppError::DuplicateEmail) => return Err(AppError::DuplicateEmail),
            Err(err) => {
                tracing::error!(error = ?err, "Failed to create user");
                return Err(AppError::CreationFailed);
            }
        };

        // The user row exists from here on; if attaching the refresh hash
        // fails the account stays logged out and the next login recovers.
        self.start_session(&user).await.map_err(|err| {
            tracing::error!(error = ?err, user_id = %user.id, "Failed to start session for new user");
            AppError::CreationFailed
        })
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> AppResult<TokenPair> {
        let Some(user) = self.repo.find_by_email(email).await? else {
            return Err(AppError::AccessDenied);
        };

        if !self.hasher.verify(&user.password_hash, password).await? {
            return Err(AppError::AccessDenied);
        }

        self.start_session(&user).await
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> AppResult<()> {
        self.repo.update_refresh_hash(user_id, None).await
    }

    /// Exchanges a refresh token for a new pair. The presented token stops
    /// working as soon as this returns, even though it has not expired.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh(&self, user_id: Uuid, refresh_token: &str) -> AppResult<TokenPair> {
        let Some(user) = self.repo.find_by_id(user_id).await? else {
            return Err(AppError::AccessDenied);
        };
        let Some(current_hash) = user.hashed_refresh_token.as_deref() else {
            return Err(AppError::AccessDenied);
        };

        if !self.hasher.verify(current_hash, refresh_token).await? {
            return Err(AppError::AccessDenied);
        }

        let tokens = self.tokens.issue(user.id, &user.email)?;
        let new_hash = self.hasher.hash(&tokens.refresh_token).await?;

        // Lost a race against a concurrent rotation of the same token.
        if !self
            .repo
            .swap_refresh_hash(user.id, current_hash, &new_hash)
            .await?
        {
            tracing::warn!(user_id = %user.id, "Refresh token rotated concurrently");
            return Err(AppError::AccessDenied);
        }

        Ok(tokens)
    }

    async fn start_session(&self, user: &User) -> AppResult<TokenPair> {
        let tokens = self.tokens.issue(user.id, &user.email)?;
        let refresh_hash = self.hasher.hash(&tokens.refresh_token).await?;
        self.repo
            .update_refresh_hash(user.id, Some(&refresh_hash))
            .await?;
        Ok(tokens)
    }
}
