use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::{api_state::ApiState, routes::corpus::CorpusSummary};

/// Liveness probe: the process is up.
pub async fn live() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({"status": "ok"})))
}

/// Readiness probe: 200 once a corpus is loaded, 503 while answers would lack context.
///
/// Does not trigger a load itself.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    let corpus = state.assistant.corpus().state().await;
    let (status, label) = if corpus.is_ready() {
        (StatusCode::OK, "ok")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "error")
    };

    (
        status,
        Json(json!({
            "status": label,
            "checks": { "corpus": CorpusSummary::from(&corpus) }
        })),
    )
}
