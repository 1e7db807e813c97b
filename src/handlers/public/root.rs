use axum::Json;
use serde_json::{json, Value};

/// GET / - service descriptor
pub async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "name": "Pet Care API",
        "version": version,
        "endpoints": {
            "health": "/health (public)",
            "care_settings": "/api/care_settings, /api/care_settings/me, /api/care_settings/verify_pin",
            "care_logs": "/api/care_logs[/:id], /api/care_logs/today, /api/care_logs/by_date, /api/care_logs/list",
            "reflection_notes": "/api/reflection_notes[/:id]",
        }
    }))
}
