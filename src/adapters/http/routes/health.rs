use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde_json::{Map, Value, json};

use crate::adapters::http::app_state::AppState;

/// Reports whether the configured user store answers a ping.
pub async fn check(State(app_state): State<AppState>) -> impl IntoResponse {
    let store = app_state.store_health.name();
    match app_state.store_health.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "info": store_status(store, "up"),
            })),
        ),
        Err(err) => {
            tracing::error!(error = ?err, store, "Health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "error": store_status(store, "down"),
                })),
            )
        }
    }
}

fn store_status(store: &str, status: &str) -> Value {
    let mut map = Map::new();
    map.insert(store.to_string(), json!({ "status": status }));
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum_test::TestServer;
    use serde_json::json;

    use crate::{
        infra::app::create_app,
        test_utils::{DownStoreHealth, TestAppStateBuilder},
    };

    #[tokio::test]
    async fn reports_up_when_store_answers() {
        let server = TestServer::new(create_app(TestAppStateBuilder::new().build())).unwrap();

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::OK);
        let body: serde_json::Value = response.json();
        assert_eq!(
            body,
            json!({ "status": "ok", "info": { "memory": { "status": "up" } } })
        );
    }

    #[tokio::test]
    async fn reports_unavailable_when_store_is_down() {
        let app_state = TestAppStateBuilder::new()
            .with_store_health(Arc::new(DownStoreHealth))
            .build();
        let server = TestServer::new(create_app(app_state)).unwrap();

        let response = server.get("/health").await;

        assert_eq!(response.status_code(), StatusCode::SERVICE_UNAVAILABLE);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"]["memory"]["status"], "down");
    }
}
