use chrono::NaiveDateTime;
use uuid::Uuid;

/// A locally registered user as seen by the auth use cases.
///
/// `hashed_refresh_token` is `None` while the user is logged out. When set it
/// holds the Argon2 hash of the only refresh token currently accepted.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
    pub hashed_refresh_token: Option<String>,
    pub created_at: Option<NaiveDateTime>,
}

impl User {
    pub fn is_logged_in(&self) -> bool {
        self.hashed_refresh_token.is_some()
    }
}
