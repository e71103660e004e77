pub mod auth;
pub mod health;

use axum::{Router, routing::get};

use crate::adapters::http::app_state::AppState;

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router(app_state))
        .route("/health", get(health::check))
}
