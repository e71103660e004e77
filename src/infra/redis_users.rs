use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use redis::{AsyncCommands, Script, aio::ConnectionManager};
use uuid::Uuid;

use super::InfraError;
use crate::{
    app_error::{AppError, AppResult},
    domain::entities::user::User,
    use_cases::auth::{StoreHealth, UserRepo},
};

/// Claims the email index and writes the user document in one step.
/// Returns 0 when the email is already taken.
const CREATE_USER_SCRIPT: &str = r#"
if redis.call('SETNX', KEYS[1], ARGV[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[2], 'id', ARGV[1], 'email', ARGV[2], 'password_hash', ARGV[3], 'created_at', ARGV[4])
return 1
"#;

/// Sets the refresh hash on an existing document only, so unknown ids
/// never leave a partial document behind.
const SET_REFRESH_HASH_SCRIPT: &str = r#"
if redis.call('EXISTS', KEYS[1]) == 0 then
    return 0
end
redis.call('HSET', KEYS[1], 'hashed_refresh_token', ARGV[1])
return 1
"#;

/// Compare-and-swap on the refresh hash.
const SWAP_REFRESH_HASH_SCRIPT: &str = r#"
if redis.call('HGET', KEYS[1], 'hashed_refresh_token') ~= ARGV[1] then
    return 0
end
redis.call('HSET', KEYS[1], 'hashed_refresh_token', ARGV[2])
return 1
"#;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

/// Document-style user store: one Redis hash per user plus an email index.
///
/// Keys:
/// - `user:{id}` hash with `id`, `email`, `password_hash`, `created_at` and
///   an optional `hashed_refresh_token`
/// - `user:email:{email}` string holding the user id
#[derive(Clone)]
pub struct RedisUserStore {
    manager: ConnectionManager,
    create_script: Script,
    set_refresh_script: Script,
    swap_refresh_script: Script,
}

impl RedisUserStore {
    pub async fn new(redis_url: &str) -> Result<Self, InfraError> {
        let client = redis::Client::open(redis_url).map_err(InfraError::RedisConnection)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(InfraError::RedisConnection)?;
        Ok(Self {
            manager,
            create_script: Script::new(CREATE_USER_SCRIPT),
            set_refresh_script: Script::new(SET_REFRESH_HASH_SCRIPT),
            swap_refresh_script: Script::new(SWAP_REFRESH_HASH_SCRIPT),
        })
    }

    fn user_key(id: Uuid) -> String {
        format!("user:{id}")
    }

    fn email_key(email: &str) -> String {
        format!("user:email:{email}")
    }

    async fn load(&self, conn: &mut ConnectionManager, id: Uuid) -> AppResult<Option<User>> {
        let fields: HashMap<String, String> = conn
            .hgetall(Self::user_key(id))
            .await
            .map_err(redis_error)?;
        if fields.is_empty() {
            return Ok(None);
        }
        user_from_fields(fields).map(Some)
    }
}

#[async_trait]
impl UserRepo for RedisUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let mut conn = self.manager.clone();
        let id = Uuid::new_v4();
        let created_at = Utc::now().naive_utc();

        let created: i64 = self
            .create_script
            .key(Self::email_key(email))
            .key(Self::user_key(id))
            .arg(id.to_string())
            .arg(email)
            .arg(password_hash)
            .arg(created_at.format(TIMESTAMP_FORMAT).to_string())
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;

        if created == 0 {
            return Err(AppError::DuplicateEmail);
        }

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            hashed_refresh_token: None,
            created_at: Some(created_at),
        })
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let mut conn = self.manager.clone();
        let id: Option<String> = conn
            .get(Self::email_key(email))
            .await
            .map_err(redis_error)?;
        let Some(id) = id else {
            return Ok(None);
        };
        let id = Uuid::parse_str(&id)
            .map_err(|e| AppError::Database(format!("Corrupt email index entry: {e}")))?;
        self.load(&mut conn, id).await
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let mut conn = self.manager.clone();
        self.load(&mut conn, id).await
    }

    async fn update_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> AppResult<()> {
        let mut conn = self.manager.clone();
        match hash {
            Some(hash) => {
                let _: i64 = self
                    .set_refresh_script
                    .key(Self::user_key(id))
                    .arg(hash)
                    .invoke_async(&mut conn)
                    .await
                    .map_err(redis_error)?;
            }
            None => {
                let _: i64 = conn
                    .hdel(Self::user_key(id), "hashed_refresh_token")
                    .await
                    .map_err(redis_error)?;
            }
        }
        Ok(())
    }

    async fn swap_refresh_hash(
        &self,
        id: Uuid,
        expected: &str,
        replacement: &str,
    ) -> AppResult<bool> {
        let mut conn = self.manager.clone();
        let swapped: i64 = self
            .swap_refresh_script
            .key(Self::user_key(id))
            .arg(expected)
            .arg(replacement)
            .invoke_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(swapped == 1)
    }
}

#[async_trait]
impl StoreHealth for RedisUserStore {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn ping(&self) -> AppResult<()> {
        let mut conn = self.manager.clone();
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(redis_error)?;
        Ok(())
    }
}

fn redis_error(err: redis::RedisError) -> AppError {
    tracing::error!(error = %err, "Redis error");
    AppError::Database("User store operation failed".into())
}

fn user_from_fields(mut fields: HashMap<String, String>) -> AppResult<User> {
    let mut take = |name: &str| {
        fields
            .remove(name)
            .ok_or_else(|| AppError::Database(format!("User document missing field {name}")))
    };

    let id = Uuid::parse_str(&take("id")?)
        .map_err(|e| AppError::Database(format!("Corrupt user id: {e}")))?;
    let email = take("email")?;
    let password_hash = take("password_hash")?;
    let created_at = take("created_at")
        .ok()
        .and_then(|raw| NaiveDateTime::parse_from_str(&raw, TIMESTAMP_FORMAT).ok());
    let hashed_refresh_token = fields.remove("hashed_refresh_token");

    Ok(User {
        id,
        email,
        password_hash,
        hashed_refresh_token,
        created_at,
    })
}
