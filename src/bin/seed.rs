//! Seeds the configured user store with demo accounts.
//! Run with: cargo run --bin seed

use dotenvy::dotenv;
use tracing::info;

use local_auth::{
    app_error::AppError,
    infra::{
        config::AppConfig,
        setup::{init_hasher, init_tracing, init_user_store},
    },
};

const DEMO_USERS: &[(&str, &str)] = &[
    ("marco@template.com", "marco@template!"),
    ("jess@template.com", "jess@template!"),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_file.as_deref());

    let store = init_user_store(&config).await?;
    let hasher = init_hasher(&config)?;

    for &(email, password) in DEMO_USERS {
        let password_hash = hasher.hash(password).await?;
        match store.repo.create(email, &password_hash).await {
            Ok(user) => info!(user_id = %user.id, email, "Seeded user"),
            Err(AppError::DuplicateEmail) => info!(email, "User already exists, skipping"),
            Err(err) => return Err(err.into()),
        }
    }

    info!(count = DEMO_USERS.len(), "Seeding finished");
    Ok(())
}
