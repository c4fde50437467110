use axum::{extract::State, Json};
use retrieval_pipeline::corpus::CorpusState;
use serde::Serialize;
use tracing::info;

use crate::api_state::ApiState;

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct CorpusSummary {
    pub status: &'static str,
    pub chunks: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl From<&CorpusState> for CorpusSummary {
    fn from(state: &CorpusState) -> Self {
        Self {
            status: state.label(),
            chunks: state.chunks().len(),
            reason: match state {
                CorpusState::Unavailable(reason) => Some(reason.to_string()),
                CorpusState::NotAttempted | CorpusState::Ready(_) => None,
            },
        }
    }
}

pub async fn get_corpus(State(state): State<ApiState>) -> Json<CorpusSummary> {
    let corpus = state.assistant.corpus().state().await;
    Json(CorpusSummary::from(&corpus))
}

pub async fn reload_corpus(State(state): State<ApiState>) -> Json<CorpusSummary> {
    let corpus = state.assistant.corpus().reload().await;
    let summary = CorpusSummary::from(&corpus);
    info!(status = summary.status, chunks = summary.chunks, "Corpus reload requested");
    Json(summary)
}
