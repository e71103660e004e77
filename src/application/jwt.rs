use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use crate::app_error::{AppError, AppResult};
use crate::domain::entities::token_pair::TokenPair;

pub const ACCESS_AUDIENCE: &str = "access";
pub const REFRESH_AUDIENCE: &str = "refresh";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub email: String,
    pub aud: String,
    /// Random per token so two pairs issued in the same second never collide.
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl TokenClaims {
    pub fn user_id(&self) -> AppResult<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| AppError::Unauthorized)
    }
}

/// Secret and lifetime for one kind of token.
#[derive(Clone)]
pub struct TokenSettings {
    pub secret: SecretString,
    pub ttl: Duration,
}

/// Signs and verifies the access/refresh pair. The two kinds use separate
/// secrets and audiences, so neither verifies as the other.
#[derive(Clone)]
pub struct TokenIssuer {
    access: TokenSettings,
    refresh: TokenSettings,
}

impl TokenIssuer {
    pub fn new(access: TokenSettings, refresh: TokenSettings) -> Self {
        Self { access, refresh }
    }

    pub fn issue(&self, user_id: Uuid, email: &str) -> AppResult<TokenPair> {
        Ok(TokenPair {
            access_token: sign(user_id, email, ACCESS_AUDIENCE, &self.access)?,
            refresh_token: sign(user_id, email, REFRESH_AUDIENCE, &self.refresh)?,
        })
    }

    pub fn verify_access(&self, token: &str) -> AppResult<TokenClaims> {
        verify(token, ACCESS_AUDIENCE, &self.access.secret)
    }

    pub fn verify_refresh(&self, token: &str) -> AppResult<TokenClaims> {
        verify(token, REFRESH_AUDIENCE, &self.refresh.secret)
    }
}

fn sign(user_id: Uuid, email: &str, audience: &str, settings: &TokenSettings) -> AppResult<String> {
    let now = OffsetDateTime::now_utc().unix_timestamp();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        email: email.to_string(),
        aud: audience.to_string(),
        jti: Uuid::new_v4().to_string(),
        iat: now,
        exp: now + settings.ttl.whole_seconds(),
    };
    let header = Header::new(Algorithm::HS256);
    encode(
        &header,
        &claims,
        &EncodingKey::from_secret(settings.secret.expose_secret().as_bytes()),
    )
    .map_err(|e| AppError::Internal(e.to_string()))
}

fn verify(token: &str, audience: &str, secret: &SecretString) -> AppResult<TokenClaims> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_audience(&[audience]);
    decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.expose_secret().as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!(error = %e, audience, "Token verification failed");
        AppError::Unauthorized
    })
}
