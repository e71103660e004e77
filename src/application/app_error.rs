use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("A user with this email address already exists")]
    DuplicateEmail,

    #[error("Could not create account")]
    CreationFailed,

    /// Every credential or refresh-token failure collapses into this variant
    /// so callers cannot tell which check rejected them.
    #[error("Access denied")]
    AccessDenied,

    #[error("Missing or invalid bearer token")]
    Unauthorized,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[derive(Clone, Copy, Debug)]
pub enum ErrorCode {
    DatabaseError,
    DuplicateEmail,
    CreationFailed,
    AccessDenied,
    Unauthorized,
    InvalidInput,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::DuplicateEmail => "DUPLICATE_EMAIL",
            ErrorCode::CreationFailed => "CREATION_FAILED",
            ErrorCode::AccessDenied => "ACCESS_DENIED",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::InvalidInput => "INVALID_INPUT",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
