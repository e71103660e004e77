use std::time::Duration;

use axum::{Router, http};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use uuid::Uuid;

use crate::adapters::{self, http::app_state::AppState};

pub fn create_app(app_state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(app_state.config.cors_origin.clone())
        .allow_methods([http::Method::GET, http::Method::POST])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION]);

    Router::new()
        .merge(adapters::http::routes::router(app_state.clone()))
        .with_state(app_state)
        .layer(cors)
        .layer(SetResponseHeaderLayer::if_not_present(
            http::header::X_CONTENT_TYPE_OPTIONS,
            http::HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            http::header::X_FRAME_OPTIONS,
            http::HeaderValue::from_static("DENY"),
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &http::Request<_>| {
                    let request_id = Uuid::new_v4();
                    tracing::info_span!(
                        "http-request",
                        method = %request.method(),
                        uri = %request.uri(),
                        version = ?request.version(),
                        request_id = %request_id
                    )
                })
                .on_response(
                    |response: &http::Response<_>, latency: Duration, _span: &tracing::Span| {
                        let status = response.status().as_u16();
                        let latency_ms = latency.as_millis() as u64;
                        if response.status().is_server_error() {
                            tracing::error!(status, latency_ms, "request completed");
                        } else if response.status().is_client_error() {
                            tracing::warn!(status, latency_ms, "request completed");
                        } else {
                            tracing::info!(status, latency_ms, "request completed");
                        }
                    },
                ),
        )
}
