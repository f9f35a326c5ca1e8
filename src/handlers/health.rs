use axum::{response::Json, http::StatusCode};
use serde_json::{json, Value};

/// GET / - service banner
pub async fn root() -> Json<Value> {
    Json(json!({
        "message": "Todo API is running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /health - liveness probe. Reports degraded (but alive) when the
/// database is unreachable; credential checks still work in that state.
pub async fn health() -> (StatusCode, Json<Value>) {
    match crate::database::manager::DatabaseManager::health_check().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "healthy" }))),
        Err(e) => {
            tracing::warn!("Health check: database unreachable: {}", e);
            (
                StatusCode::OK,
                Json(json!({ "status": "healthy", "database": "unavailable" })),
            )
        }
    }
}
