//! Test app state builder for HTTP-level integration testing.
//!
//! `TestAppStateBuilder` creates an `AppState` backed by `InMemoryUserRepo`
//! and the fast test hasher, with secrets matching `test_token_issuer`.

use std::sync::Arc;

use crate::{
    adapters::http::app_state::AppState,
    application::{
        jwt::TokenIssuer,
        use_cases::auth::{AuthUseCases, StoreHealth, UserRepo},
    },
    domain::entities::user::User,
    infra::config::AppConfig,
    test_utils::{InMemoryUserRepo, test_config, test_hasher},
};

/// Builder for creating `AppState` with in-memory mocks for testing.
///
/// # Example
///
/// ```ignore
/// let user = create_test_user("a@x.com", "Pw1!", |_| {}).await;
///
/// let app_state = TestAppStateBuilder::new()
///     .with_user(user)
///     .build();
/// ```
#[derive(Default)]
pub struct TestAppStateBuilder {
    users: Vec<User>,
    config: Option<AppConfig>,
    store_health: Option<Arc<dyn StoreHealth>>,
}

impl TestAppStateBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(mut self, user: User) -> Self {
        self.users.push(user);
        self
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_store_health(mut self, store_health: Arc<dyn StoreHealth>) -> Self {
        self.store_health = Some(store_health);
        self
    }

    pub fn build(self) -> AppState {
        let config = self.config.unwrap_or_else(|| test_config(|_| {}));
        let repo = Arc::new(InMemoryUserRepo::with_users(self.users));

        let token_issuer = Arc::new(TokenIssuer::new(
            config.access_token_settings(),
            config.refresh_token_settings(),
        ));
        let auth_use_cases = AuthUseCases::new(
            repo.clone() as Arc<dyn UserRepo>,
            Arc::new(test_hasher()),
            token_issuer.clone(),
        );

        AppState {
            config: Arc::new(config),
            auth_use_cases: Arc::new(auth_use_cases),
            token_issuer,
            store_health: self.store_health.unwrap_or(repo),
        }
    }
}
