//! Test data factories for creating valid test fixtures.
//!
//! Each factory function creates a complete, valid object with sensible defaults.
//! Use the closure parameter to override specific fields as needed.

use std::net::SocketAddr;

use axum::http::HeaderValue;
use secrecy::SecretString;
use time::Duration;
use uuid::Uuid;

use crate::{
    application::{
        hasher::{Argon2Hasher, CredentialHasher},
        jwt::TokenIssuer,
    },
    domain::entities::user::User,
    infra::config::{AppConfig, StoreBackend},
};

pub const TEST_ACCESS_SECRET: &str = "at-secret-for-tests";
pub const TEST_REFRESH_SECRET: &str = "rt-secret-for-tests";

/// Argon2id with minimal cost so tests stay fast.
pub fn test_hasher() -> Argon2Hasher {
    Argon2Hasher::with_params(1024, 1, 1).unwrap()
}

/// Config with fixed test secrets, 15 minute access and 30 day refresh tokens.
pub fn test_config(overrides: impl FnOnce(&mut AppConfig)) -> AppConfig {
    let mut config = AppConfig {
        access_token_secret: SecretString::new(TEST_ACCESS_SECRET.into()),
        access_token_ttl: Duration::minutes(15),
        refresh_token_secret: SecretString::new(TEST_REFRESH_SECRET.into()),
        refresh_token_ttl: Duration::days(30),
        bind_addr: SocketAddr::from(([127, 0, 0, 1], 0)),
        cors_origin: HeaderValue::from_static("http://localhost:3000"),
        user_store: StoreBackend::Postgres,
        database_url: None,
        redis_url: "redis://127.0.0.1:6379".to_string(),
        argon2_memory_kib: 1024,
        argon2_iterations: 1,
        argon2_parallelism: 1,
        log_file: None,
    };
    overrides(&mut config);
    config
}

/// Issuer matching the secrets of `test_config`.
pub fn test_token_issuer() -> TokenIssuer {
    let config = test_config(|_| {});
    TokenIssuer::new(
        config.access_token_settings(),
        config.refresh_token_settings(),
    )
}

/// Create a logged-out user whose password hash verifies against `password`.
pub async fn create_test_user(
    email: &str,
    password: &str,
    overrides: impl FnOnce(&mut User),
) -> User {
    let mut user = User {
        id: Uuid::new_v4(),
        email: email.to_string(),
        password_hash: test_hasher().hash(password).await.unwrap(),
        hashed_refresh_token: None,
        created_at: Some(chrono::Utc::now().naive_utc()),
    };
    overrides(&mut user);
    user
}
