use crate::app_error::{AppError, ErrorCode};
use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the error before it gets converted into a status response.
        match &self {
            AppError::Database(_) | AppError::Internal(_) => {
                tracing::error!(error = ?self, "Request failed")
            }
            _ => tracing::warn!(error = ?self, "Request rejected"),
        }

        match self {
            AppError::Database(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::DatabaseError, None)
            }
            AppError::DuplicateEmail => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::DuplicateEmail,
                Some("A user with this email address already exists".into()),
            ),
            AppError::CreationFailed => error_resp(
                StatusCode::BAD_REQUEST,
                ErrorCode::CreationFailed,
                Some("Could not create account".into()),
            ),
            AppError::AccessDenied => error_resp(
                StatusCode::FORBIDDEN,
                ErrorCode::AccessDenied,
                Some("Access denied".into()),
            ),
            AppError::Unauthorized => {
                error_resp(StatusCode::UNAUTHORIZED, ErrorCode::Unauthorized, None)
            }
            AppError::InvalidInput(msg) => {
                error_resp(StatusCode::BAD_REQUEST, ErrorCode::InvalidInput, Some(msg))
            }
            AppError::Internal(_) => {
                error_resp(StatusCode::INTERNAL_SERVER_ERROR, ErrorCode::InternalError, None)
            }
        }
    }
}

fn error_resp(status: StatusCode, code: ErrorCode, message: Option<String>) -> Response {
    let body = match message {
        Some(msg) => serde_json::json!({ "code": code.as_str(), "message": msg }),
        None => serde_json::json!({ "code": code.as_str() }),
    };
    (status, Json(body)).into_response()
}
