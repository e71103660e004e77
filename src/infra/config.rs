use std::net::SocketAddr;
use std::str::FromStr;

use axum::http::HeaderValue;
use env_helpers::get_env_default;
use secrecy::SecretString;
use time::Duration;

use super::error::InfraError;
use crate::application::jwt::TokenSettings;

/// Which `UserRepo` implementation backs the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreBackend {
    /// Relational store (PostgreSQL via sqlx).
    #[default]
    Postgres,
    /// Document-style store (one Redis hash per user).
    Redis,
}

impl StoreBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreBackend::Postgres => "postgres",
            StoreBackend::Redis => "redis",
        }
    }
}

impl std::fmt::Display for StoreBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "redis" => Ok(StoreBackend::Redis),
            _ => Err(format!(
                "Invalid user store: {}. Must be 'postgres' or 'redis'",
                s
            )),
        }
    }
}

pub struct AppConfig {
    pub access_token_secret: SecretString,
    pub access_token_ttl: Duration,
    pub refresh_token_secret: SecretString,
    pub refresh_token_ttl: Duration,
    pub bind_addr: SocketAddr,
    pub cors_origin: HeaderValue,
    pub user_store: StoreBackend,
    /// Required when `user_store` is `Postgres`.
    pub database_url: Option<String>,
    pub redis_url: String,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
    pub argon2_parallelism: u32,
    /// When set, structured JSON logs are also written to this file.
    pub log_file: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, InfraError> {
        let access_token_secret = SecretString::new(required("ACCESS_TOKEN_SECRET")?.into());
        let refresh_token_secret = SecretString::new(required("REFRESH_TOKEN_SECRET")?.into());

        let access_token_ttl = expiration(
            "ACCESS_TOKEN_EXPIRATION",
            get_env_default("ACCESS_TOKEN_EXPIRATION", "15m".to_string()),
        )?;
        let refresh_token_ttl = expiration(
            "REFRESH_TOKEN_EXPIRATION",
            get_env_default("REFRESH_TOKEN_EXPIRATION", "30d".to_string()),
        )?;

        let bind_addr: SocketAddr =
            parsed_env("BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?;
        let cors_origin: HeaderValue =
            get_env_default("CORS_ORIGIN", String::from("http://localhost:3000"))
                .parse()
                .map_err(|_| InfraError::ConfigInvalid {
                    var: "CORS_ORIGIN",
                    reason: "not a valid header value".into(),
                })?;

        let user_store: StoreBackend = get_env_default("USER_STORE", "postgres".to_string())
            .parse()
            .map_err(|reason| InfraError::ConfigInvalid {
                var: "USER_STORE",
                reason,
            })?;
        let database_url = std::env::var("DATABASE_URL").ok();
        if user_store == StoreBackend::Postgres && database_url.is_none() {
            return Err(InfraError::ConfigMissing {
                var: "DATABASE_URL",
            });
        }
        let redis_url: String = get_env_default("REDIS_URL", "redis://127.0.0.1:6379".to_string());

        let argon2_memory_kib: u32 =
            parsed_env("ARGON2_MEMORY_KIB", argon2::Params::DEFAULT_M_COST)?;
        let argon2_iterations: u32 =
            parsed_env("ARGON2_ITERATIONS", argon2::Params::DEFAULT_T_COST)?;
        let argon2_parallelism: u32 =
            parsed_env("ARGON2_PARALLELISM", argon2::Params::DEFAULT_P_COST)?;

        let log_file = std::env::var("LOG_FILE").ok().filter(|s| !s.trim().is_empty());

        Ok(Self {
            access_token_secret,
            access_token_ttl,
            refresh_token_secret,
            refresh_token_ttl,
            bind_addr,
            cors_origin,
            user_store,
            database_url,
            redis_url,
            argon2_memory_kib,
            argon2_iterations,
            argon2_parallelism,
            log_file,
        })
    }

    pub fn access_token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.access_token_secret.clone(),
            ttl: self.access_token_ttl,
        }
    }

    pub fn refresh_token_settings(&self) -> TokenSettings {
        TokenSettings {
            secret: self.refresh_token_secret.clone(),
            ttl: self.refresh_token_ttl,
        }
    }
}

fn required(var: &'static str) -> Result<String, InfraError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.is_empty())
        .ok_or(InfraError::ConfigMissing { var })
}

/// Reads `var` and parses it, falling back to `default` when unset or blank.
fn parsed_env<T>(var: &'static str, default: T) -> Result<T, InfraError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    parse_or_default(var, std::env::var(var).ok(), default)
}

fn parse_or_default<T>(var: &'static str, raw: Option<String>, default: T) -> Result<T, InfraError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(default),
        Some(value) => value.parse().map_err(|e: T::Err| InfraError::ConfigInvalid {
            var,
            reason: format!("{value:?}: {e}"),
        }),
    }
}

fn expiration(var: &'static str, raw: String) -> Result<Duration, InfraError> {
    parse_expiration(&raw).map_err(|reason| InfraError::ConfigInvalid { var, reason })
}

/// Parses token lifetimes such as `"900"` (seconds), `"15m"`, `"12h"` or `"30d"`.
///
/// Supported units: `s`, `m`, `h`, `d`, `w`. Zero and negative lifetimes are rejected.
pub fn parse_expiration(raw: &str) -> Result<Duration, String> {
    let raw = raw.trim();
    let split = raw
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(raw.len());
    let (digits, unit) = raw.split_at(split);

    let amount: i64 = digits
        .parse()
        .map_err(|_| format!("expected a number with optional unit, got {raw:?}"))?;
    if amount == 0 {
        return Err("expiration must be greater than zero".into());
    }

    let seconds_per_unit: i64 = match unit {
        "" | "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        other => return Err(format!("unknown time unit {other:?}")),
    };
    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::seconds)
        .ok_or_else(|| format!("expiration {raw:?} is too large"))
}
