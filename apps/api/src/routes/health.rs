use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status, version, storage backend and resume count.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    let resumes = state.store.read().await.resumes().len();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "resume-api",
        "storage": state.config.storage_backend.as_str(),
        "resumes": resumes
    }))
}
