use api_state::ApiState;
use axum::{
    extract::FromRef,
    routing::{get, post},
    Router,
};
use routes::{
    chat::chat,
    corpus::{get_corpus, reload_corpus},
    probes::{live, ready},
};

pub mod api_state;
pub mod error;
mod routes;

/// Router for API functionality, version 1
pub fn api_routes_v1<S>() -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    ApiState: FromRef<S>,
{
    Router::new()
        .route("/ready", get(ready))
        .route("/live", get(live))
        .route("/chat", post(chat))
        .route("/corpus", get(get_corpus))
        .route("/corpus/reload", post(reload_corpus))
}
