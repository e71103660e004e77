use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::Serialize;
use uuid::Uuid;

use crate::{
    adapters::persistence::PostgresPersistence,
    app_error::{AppError, AppResult},
    domain::entities::user::User,
    use_cases::auth::{StoreHealth, UserRepo},
};

// User struct as stored in the db.
#[derive(sqlx::FromRow, Debug, Serialize)]
pub struct UserDb {
    pub id: Uuid,
    pub email: String,
    #[serde(skip)]
    pub password_hash: String,
    #[serde(skip)]
    pub hashed_refresh_token: Option<String>,
    pub created_at: Option<NaiveDateTime>,
    pub updated_at: Option<NaiveDateTime>,
}

impl From<UserDb> for User {
    fn from(row: UserDb) -> Self {
        User {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            hashed_refresh_token: row.hashed_refresh_token,
            created_at: row.created_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, email, password_hash, hashed_refresh_token, created_at, updated_at";

#[async_trait]
impl UserRepo for PostgresPersistence {
    async fn create(&self, email: &str, password_hash: &str) -> AppResult<User> {
        let id = Uuid::new_v4();
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "INSERT INTO users (id, email, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|err| {
            // Ids are random, so the only unique column that can collide is email.
            if let sqlx::Error::Database(db_err) = &err
                && db_err.is_unique_violation()
            {
                return AppError::DuplicateEmail;
            }
            AppError::from(err)
        })?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        let row = sqlx::query_as::<_, UserDb>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(row.map(User::from))
    }

    async fn update_refresh_hash(&self, id: Uuid, hash: Option<&str>) -> AppResult<()> {
        match hash {
            Some(hash) => {
                sqlx::query(
                    "UPDATE users SET hashed_refresh_token = $2, updated_at = NOW() WHERE id = $1",
                )
                .bind(id)
                .bind(hash)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;
            }
            None => {
                sqlx::query(
                    r#"UPDATE users SET hashed_refresh_token = NULL, updated_at = NOW()
                       WHERE id = $1 AND hashed_refresh_token IS NOT NULL"#,
                )
                .bind(id)
                .execute(&self.pool)
                .await
                .map_err(AppError::from)?;
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
        let result = sqlx::query(
            r#"UPDATE users SET hashed_refresh_token = $3, updated_at = NOW()
               WHERE id = $1 AND hashed_refresh_token = $2"#,
        )
        .bind(id)
        .bind(expected)
        .bind(replacement)
        .execute(&self.pool)
        .await
        .map_err(AppError::from)?;
        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl StoreHealth for PostgresPersistence {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::from)?;
        Ok(())
    }
}
