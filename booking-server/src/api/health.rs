//! Health check endpoint

use axum::Json;
use axum::extract::State;

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    let storage_ok = sqlx::query_scalar::<_, i64>("SELECT 1")
        .fetch_one(&state.db.read_pool)
        .await
        .is_ok();

    Json(serde_json::json!({
        "status": if storage_ok { "ok" } else { "degraded" },
        "service": "booking-server",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
