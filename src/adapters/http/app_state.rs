use std::sync::Arc;

use crate::{
    application::jwt::TokenIssuer,
    infra::config::AppConfig,
    use_cases::auth::{AuthUseCases, StoreHealth},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub auth_use_cases: Arc<AuthUseCases>,
    pub token_issuer: Arc<TokenIssuer>,
    pub store_health: Arc<dyn StoreHealth>,
}
