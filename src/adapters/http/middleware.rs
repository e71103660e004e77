use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{Authorization, HeaderMapExt, authorization::Bearer};
use uuid::Uuid;

use crate::{adapters::http::app_state::AppState, app_error::AppError};

/// Caller identified by a valid access token.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: Uuid,
}

/// Caller presenting a valid refresh token, kept raw so the use case can
/// check it against the stored hash.
#[derive(Clone, Debug)]
pub struct RefreshSession {
    pub user_id: Uuid,
    pub refresh_token: String,
}

pub async fn require_access_token(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = app_state.token_issuer.verify_access(&token)?;

    request.extensions_mut().insert(CurrentUser {
        id: claims.user_id()?,
    });

    Ok(next.run(request).await)
}

pub async fn require_refresh_token(
    State(app_state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;
    let claims = app_state.token_issuer.verify_refresh(&token)?;

    request.extensions_mut().insert(RefreshSession {
        user_id: claims.user_id()?,
        refresh_token: token,
    });

    Ok(next.run(request).await)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .typed_get::<Authorization<Bearer>>()
        .map(|auth| auth.token().trim().to_string())
        .filter(|token| !token.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn extracts_bearer_token() {
        assert_eq!(
            bearer_token(&headers_with("Bearer abc.def.ghi")).as_deref(),
            Some("abc.def.ghi")
        );
    }

    #[test]
    fn ignores_missing_or_foreign_schemes() {
        assert!(bearer_token(&HeaderMap::new()).is_none());
        assert!(bearer_token(&headers_with("Basic dXNlcjpwYXNz")).is_none());
    }
}
