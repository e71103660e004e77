use axum::{
    Extension, Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::IntoResponse,
    routing::post,
};
use serde::Deserialize;

use crate::{
    adapters::http::{
        app_state::AppState,
        middleware::{CurrentUser, RefreshSession, require_access_token, require_refresh_token},
    },
    app_error::AppResult,
    application::validators::validate_credentials,
};

#[derive(Deserialize)]
struct CredentialsPayload {
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
}

pub fn router(app_state: AppState) -> Router<AppState> {
    Router::new()
        .route("/local/register", post(register))
        .route("/local/login", post(login))
        .route(
            "/logout",
            post(logout).layer(middleware::from_fn_with_state(
                app_state.clone(),
                require_access_token,
            )),
        )
        .route(
            "/refresh",
            post(refresh).layer(middleware::from_fn_with_state(
                app_state,
                require_refresh_token,
            )),
        )
}

async fn register(
    State(app_state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    let credentials = validate_credentials(&payload.email, &payload.password)?;
    let tokens = app_state
        .auth_use_cases
        .register(&credentials.email, &credentials.password)
        .await?;
    Ok((StatusCode::CREATED, Json(tokens)))
}

async fn login(
    State(app_state): State<AppState>,
    Json(payload): Json<CredentialsPayload>,
) -> AppResult<impl IntoResponse> {
    let credentials = validate_credentials(&payload.email, &payload.password)?;
    let tokens = app_state
        .auth_use_cases
        .login(&credentials.email, &credentials.password)
        .await?;
    Ok((StatusCode::OK, Json(tokens)))
}

async fn logout(
    State(app_state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> AppResult<StatusCode> {
    app_state.auth_use_cases.logout(user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn refresh(
    State(app_state): State<AppState>,
    Extension(session): Extension<RefreshSession>,
) -> AppResult<impl IntoResponse> {
    let tokens = app_state
        .auth_use_cases
        .refresh(session.user_id, &session.refresh_token)
        .await?;
    Ok((StatusCode::OK, Json(tokens)))
}
