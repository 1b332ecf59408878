use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Returns service status plus the loaded vocabulary and embedding dimensionality.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "relevance-api",
        "skill_vocabulary": state.engine.canonicalizer().vocabulary_size(),
        "embedding_dimension": state.engine.embedder().dimension()
    }))
}
