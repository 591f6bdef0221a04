use axum::{
    Json, Router,
    extract::State,
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::Utc;
use http::{StatusCode, header::CONTENT_TYPE};
use serde_json::json;

use sonora::{METRICS_CONTENT_TYPE, StorageError};

use crate::session::RequestContext;
use crate::state::AppState;

pub(super) fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health))
        .route("/api/db/health", get(db_health))
        .route("/api/metrics", get(metrics))
}

async fn health(State(state): State<AppState>, context: RequestContext) -> Json<serde_json::Value> {
    let database = match state.catalog.ping().await {
        Ok(()) => "healthy",
        Err(e) => {
            tracing::warn!(
                component = "api",
                request_id = %context.request_id,
                error = %e,
                "Database unreachable during health check"
            );
            "unhealthy"
        }
    };

    tracing::debug!(
        component = "api",
        request_id = %context.request_id,
        %database,
        "Health check completed"
    );
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "services": {
            "database": database,
            "application": "healthy",
        },
    }))
}

async fn db_health(State(state): State<AppState>) -> Response {
    let result = async {
        state.catalog.ping().await?;
        state.catalog.statistics().await
    }
    .await;

    match result {
        Ok(statistics) => Json(json!({
            "status": "success",
            "message": "Database connection successful",
            "connected": true,
            "timestamp": Utc::now().to_rfc3339(),
            "statistics": statistics,
        }))
        .into_response(),
        Err(e) => db_health_failure(&e),
    }
}

fn db_health_failure(err: &StorageError) -> Response {
    tracing::error!(component = "database", error = %err, "Database health check failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({
            "status": "error",
            "message": err.to_string(),
            "connected": false,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
        .into_response()
}

async fn metrics(State(state): State<AppState>) -> Response {
    (
        [(CONTENT_TYPE, METRICS_CONTENT_TYPE)],
        state.metrics.render(),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use http::StatusCode;

    use super::*;
    use crate::test_utils::{TestApp, body_json, body_string, get};

    #[tokio::test]
    async fn test_health_reports_services() {
        let app = TestApp::new().await;

        let response = app.send(get("/api/health", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["services"]["database"], "healthy");
        assert_eq!(body["services"]["application"], "healthy");
        assert!(chrono::DateTime::parse_from_rfc3339(body["timestamp"].as_str().unwrap()).is_ok());
    }

    #[tokio::test]
    async fn test_db_health_includes_statistics() {
        let app = TestApp::new().await;
        app.register("a@x.com", "longenough1").await;

        let response = app.send(get("/api/db/health", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["connected"], true);
        assert_eq!(body["statistics"]["totalUsers"], 1);
        assert_eq!(body["statistics"]["publishedTracks"], 0);
    }

    #[tokio::test]
    async fn test_db_health_failure_body() {
        let response = db_health_failure(&StorageError::Storage("connection refused".to_string()));

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["connected"], false);
        assert!(body["message"].as_str().unwrap().contains("refused"));
    }

    #[tokio::test]
    async fn test_metrics_exposition() {
        let app = TestApp::new().await;
        app.send(get("/api/health", None)).await;

        let response = app.send(get("/api/metrics", None)).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_TYPE], METRICS_CONTENT_TYPE);
        let text = body_string(response).await;
        assert!(text.contains("http_requests_total"));
        assert!(text.contains("route=\"/api/health\""));
        assert!(text.contains("db_queries_total"));
    }
}
