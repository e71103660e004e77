//! In-memory and failing implementations of the user store ports.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use crate::{
    app_error::{AppError, AppResult},
    application::use_cases::auth::{StoreHealth, UserRepo},
    domain::entities::user::User,
};

// ============================================================================
// InMemoryUserRepo
// ============================================================================

/// In-memory implementation of UserRepo for testing. Email uniqueness is
/// case-sensitive, matching the real stores.
#[derive(Default)]
pub struct InMemoryUserRepo {
    pub users: Mutex<HashMap<Uuid, User>>,
}

impl InMemoryUserRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_users(users: Vec<User>) -> Self {
        let map: HashMap<Uuid, User> = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Mutex::new(map),
        }
    }

    pub fn get(&self, id: Uuid) -> Option<User> {
        self.users.lock().unwrap().get(&id).cloned()
    }

    pub fn get_by_email(&self, email: &str) -> Option<User> {
        self.users
            .lock()
            .unwrap()
            .values()
            .find(|u| u.email == email)
            .cloned()
    }

    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserRepo for InMemoryUserRepo {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.values().any(|u| u.email == email) {
            return Err(AppError::DuplicateEmail);
        }

        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            hashed_refresh_token: None,
            created_at: Some(chrono::Utc::now().naive_utc()),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.get_by_email(email))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.get(id))
    }

    async fn update_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> AppResult<()> {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.hashed_refresh_token = hash.map(str::to_string);
        }
        Ok(())
    }

    async fn swap_refresh_hash(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> AppResult<bool> {
        let mut users = self.users.lock().unwrap();
        match users.get_mut(&id) {
            Some(user) if user.hashed_refresh_token.as_deref() == Some(expected) => {
                user.hashed_refresh_token = Some(replacement.to_string());
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl StoreHealth for InMemoryUserRepo {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}

// ============================================================================
// Failing stubs
// ============================================================================

/// UserRepo whose every call fails with a database error.
#[derive(Default)]
pub struct FailingUserRepo;

#[async_trait]
impl UserRepo for FailingUserRepo {
    async fn create(&self, _email: &str, _password_hash: &str) -> AppResult<User> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn find_by_email(&self, _email: &str) -> AppResult<Option<User>> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn find_by_id(&self, _id: Uuid) -> AppResult<Option<User>> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn update_refresh_hash(&self, _id: Uuid, _hash: Option<&str>) -> AppResult<()> {
        Err(AppError::Database("connection refused".into()))
    }

    async fn swap_refresh_hash(
        &self,
        _id: Uuid,
        _expected: &str,
        _replacement: &str,
    ) -> AppResult<bool> {
        Err(AppError::Database("connection refused".into()))
    }
}

/// StoreHealth that always reports the store as down.
#[derive(Default)]
pub struct DownStoreHealth;

#[async_trait]
impl StoreHealth for DownStoreHealth {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn ping(&self) -> AppResult<()> {
        Err(AppError::Database("connection refused".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn swap_only_replaces_expected_hash() {
        let repo = InMemoryUserRepo::new();
        let user = repo.create("a@x.com", "pw-hash").await.unwrap();

        assert!(!repo.swap_refresh_hash(user.id, "h1", "h2").await.unwrap());

        repo.update_refresh_hash(user.id, Some("h1")).await.unwrap();
        assert!(repo.swap_refresh_hash(user.id, "h1", "h2").await.unwrap());
        assert!(!repo.swap_refresh_hash(user.id, "h1", "h3").await.unwrap());
        assert_eq!(
            repo.get(user.id).unwrap().hashed_refresh_token.as_deref(),
            Some("h2")
        );
    }

    #[tokio::test]
    async fn update_for_unknown_id_creates_nothing() {
        let repo = InMemoryUserRepo::new();
        repo.update_refresh_hash(Uuid::new_v4(), Some("h1"))
            .await
            .unwrap();
        assert_eq!(repo.count(), 0);
    }
}
