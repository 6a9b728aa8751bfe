use axum::{extract::State, response::Json};
use sea_orm::ConnectionTrait;
use serde_json::{json, Value};

use crate::server::app::AppState;

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service health"))
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let database = match state.db.execute_unprepared("SELECT 1").await {
        Ok(_) => "ok",
        Err(err) => {
            tracing::warn!("health check database probe failed: {}", err);
            "unavailable"
        }
    };
    Json(json!({
        "status": "healthy",
        "service": "farm-portal",
        "version": env!("CARGO_PKG_VERSION"),
        "database": database,
    }))
}
