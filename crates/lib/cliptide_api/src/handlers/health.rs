//! Health endpoint — liveness and database connectivity probe.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::AppResult;
use crate::models::HealthResponse;

/// `GET /api/v1/health` — verifies the service is up and the database
/// is reachable.
pub async fn health_handler(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    let db_connected = sqlx::query("SELECT 1").execute(&state.pool).await.is_ok();

    Ok(Json(HealthResponse {
        service: "cliptide".to_string(),
        version: cliptide_core::version().to_string(),
        db_connected,
    }))
}
