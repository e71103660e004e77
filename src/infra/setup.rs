use std::fs::File;
use std::sync::{Arc, Mutex};

use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::{
    adapters::http::app_state::AppState,
    application::{
        hasher::{Argon2Hasher, CredentialHasher},
        jwt::TokenIssuer,
    },
    infra::{
        InfraError,
        config::{AppConfig, StoreBackend},
        postgres_persistence,
        redis_users::RedisUserStore,
    },
    use_cases::auth::{AuthUseCases, StoreHealth, UserRepo},
};

/// The configured user store, seen through both of its ports.
pub struct UserStore {
    pub repo: Arc<dyn UserRepo>,
    pub health: Arc<dyn StoreHealth>,
}

pub async fn init_app_state(config: AppConfig) -> Result<AppState, InfraError> {
    let store = init_user_store(&config).await?;
    let hasher = init_hasher(&config)?;

    let token_issuer = Arc::new(TokenIssuer::new(
        config.access_token_settings(),
        config.refresh_token_settings(),
    ));

    let auth_use_cases = AuthUseCases::new(store.repo, hasher, token_issuer.clone());

    Ok(AppState {
        config: Arc::new(config),
        auth_use_cases: Arc::new(auth_use_cases),
        token_issuer,
        store_health: store.health,
    })
}

pub async fn init_user_store(config: &AppConfig) -> Result<UserStore, InfraError> {
    tracing::info!(backend = %config.user_store, "Initializing user store");

    match config.user_store {
        StoreBackend::Postgres => {
            let database_url = config
                .database_url
                .as_deref()
                .ok_or(InfraError::ConfigMissing {
                    var: "DATABASE_URL",
                })?;
            let postgres = Arc::new(postgres_persistence(database_url).await?);
            Ok(UserStore {
                repo: postgres.clone(),
                health: postgres,
            })
        }
        StoreBackend::Redis => {
            let redis = Arc::new(RedisUserStore::new(&config.redis_url).await?);
            Ok(UserStore {
                repo: redis.clone(),
                health: redis,
            })
        }
    }
}

pub fn init_hasher(config: &AppConfig) -> Result<Arc<dyn CredentialHasher>, InfraError> {
    let hasher = Argon2Hasher::with_params(
        config.argon2_memory_kib,
        config.argon2_iterations,
        config.argon2_parallelism,
    )
    .map_err(InfraError::HasherInit)?;
    Ok(Arc::new(hasher))
}

pub fn init_tracing(log_file: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "local_auth=debug,seed=debug,tower_http=debug".into());

    // Console (pretty logs)
    let console_layer = fmt::layer()
        .with_target(false) // don't show target (module path)
        .with_level(true) // show log level
        .pretty(); // human-friendly, with colors

    // File (structured JSON logs), only when LOG_FILE is set
    let mut file_error = None;
    let json_layer = match log_file.map(|path| (path, File::create(path))) {
        Some((_, Ok(file))) => Some(
            fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_current_span(true)
                .with_span_list(true),
        ),
        Some((path, Err(err))) => {
            file_error = Some((path.to_string(), err));
            None
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(json_layer)
        .try_init()
        .ok();

    if let Some((path, err)) = file_error {
        tracing::warn!(path = %path, error = %err, "Cannot create log file, logging to console only");
    }
}
