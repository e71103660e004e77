use dotenvy::dotenv;
use tracing::info;

use local_auth::infra::{
    InfraError,
    app::create_app,
    config::AppConfig,
    setup::{init_app_state, init_tracing},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let config = AppConfig::from_env()?;
    init_tracing(config.log_file.as_deref());

    let app_state = init_app_state(config).await?;

    let bind_addr = app_state.config.bind_addr;

    let app = create_app(app_state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .map_err(InfraError::TcpBind)?;

    info!("Backend listening at {}", &listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .map_err(InfraError::Server)?;

    Ok(())
}
