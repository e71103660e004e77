use sqlx::{PgPool, migrate::Migrator, postgres::PgPoolOptions};
use tracing::info;

use super::InfraError;

pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

pub async fn init_db(database_url: &str) -> Result<PgPool, InfraError> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .map_err(InfraError::DatabaseConnection)?;

    info!("Connected to database!");

    MIGRATOR.run(&pool).await?;
    info!("Database migrations applied");

    Ok(pool)
}
