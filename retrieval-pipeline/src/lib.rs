pub mod answer_retrieval;
pub mod completion;
pub mod corpus;
pub mod scoring;
pub mod tokenize;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

use std::sync::Arc;

use answer_retrieval::{assemble_prompt, ChatPrompt, DEFAULT_SYSTEM_PROMPT};
use common::{
    conversation::{ConversationSink, Sender},
    error::AppError,
    utils::config::AppConfig,
};
use completion::CompletionClient;
use corpus::CorpusStore;
use scoring::{rank_chunks, score_chunks, PromptContext, TOP_K};
use tokenize::tokenize;
use tracing::{debug, instrument};

/// Selects the top-`k` chunks for a question. Pure; an empty corpus gives an empty context.
pub fn retrieve_context<S>(question: &str, chunks: &[S], k: usize) -> PromptContext
where
    S: AsRef<str>,
{
    let query_tokens = tokenize(question);
    let ranked = rank_chunks(score_chunks(&query_tokens, chunks), k);
    debug!(
        query_tokens = query_tokens.len(),
        candidates = chunks.len(),
        selected = ranked.len(),
        "Ranked corpus chunks"
    );
    PromptContext::from(ranked)
}

/// Session-scoped question answering over the dashboard corpus.
pub struct ChatAssistant {
    corpus: Arc<CorpusStore>,
    completion: CompletionClient,
    system_prompt: String,
}

impl ChatAssistant {
    pub fn new(
        corpus: Arc<CorpusStore>,
        completion: CompletionClient,
        system_prompt: impl Into<String>,
    ) -> Self {
        Self {
            corpus,
            completion,
            system_prompt: system_prompt.into(),
        }
    }

    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::new();
        let corpus = Arc::new(CorpusStore::from_config(http.clone(), config)?);
        let completion = CompletionClient::from_config(http, config)?;
        let system_prompt = config
            .system_prompt
            .clone()
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        Ok(Self::new(corpus, completion, system_prompt))
    }

    pub fn corpus(&self) -> &Arc<CorpusStore> {
        &self.corpus
    }

    /// Waits for the corpus to be ready, then builds the prompt for `question`.
    pub async fn prepare_prompt(&self, question: &str) -> ChatPrompt {
        let state = self.corpus.ready().await;
        let context = retrieve_context(question, state.chunks(), TOP_K);
        assemble_prompt(&self.system_prompt, question, &context)
    }

    /// Answers one question. Failures come back as displayable text.
    #[instrument(skip_all, fields(question_len = question.len()))]
    pub async fn answer(&self, question: &str) -> String {
        let prompt = self.prepare_prompt(question).await;
        self.completion.complete(&prompt).await
    }

    /// Displays the question, answers it and displays the reply.
    ///
    /// Blank input is ignored and returns `None`.
    pub async fn submit(&self, message: &str, sink: &dyn ConversationSink) -> Option<String> {
        let question = message.trim();
        if question.is_empty() {
            return None;
        }

        sink.display(question, Sender::User);
        let reply = self.answer(question).await;
        sink.display(&reply, Sender::Bot);
        Some(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        completion::{GenerationParams, CONNECTIVITY_FAILURE_REPLY},
        corpus::CorpusSource,
        test_utils::{spawn_mock_server, unreachable_addr, RecordingSink},
    };
    use axum::{routing::post, Json, Router};
    use serde_json::{json, Value};
    use std::{path::PathBuf, sync::Mutex};
    use url::Url;

    const CORPUS: &str = "Bengaluru handled 412 departures last week. \
        Delhi handled 910 departures last week. \
        Evening departure delays at Delhi average 24 minutes. \
        Morning arrivals at Bengaluru are mostly on time. \
        The dashboard refreshes daily.";

    /// Completion mock that echoes the user prompt back as the answer.
    async fn echo_completion() -> (Url, Arc<Mutex<Vec<String>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let router = Router::new().route(
            "/chat/completions",
            post(move |Json(body): Json<Value>| {
                let sink = Arc::clone(&sink);
                async move {
                    let user = body["messages"][1]["content"]
                        .as_str()
                        .unwrap_or_default()
                        .to_owned();
                    sink.lock().expect("lock").push(user.clone());
                    Json(json!({"choices":[{"message":{"content": format!("  {user}  ")}}]}))
                }
            }),
        );
        let addr = spawn_mock_server(router).await;
        let url = Url::parse(&format!("http://{addr}/chat/completions")).expect("url");
        (url, seen)
    }

    fn assistant(corpus_path: PathBuf, endpoint: Url) -> ChatAssistant {
        let http = reqwest::Client::new();
        let corpus = Arc::new(CorpusStore::new(
            http.clone(),
            CorpusSource::File(corpus_path),
            true,
        ));
        let completion =
            CompletionClient::new(http, endpoint, "key", GenerationParams::default());
        ChatAssistant::new(corpus, completion, DEFAULT_SYSTEM_PROMPT)
    }

    #[test]
    fn test_retrieve_context_picks_best_chunks() {
        let chunks = corpus::split_sentences(CORPUS);
        let context = retrieve_context("Delhi evening departure delays", &chunks, TOP_K);

        assert_eq!(
            context.chunks(),
            [
                "Evening departure delays at Delhi average 24 minutes.",
                "Delhi handled 910 departures last week.",
            ]
        );
    }

    #[test]
    fn test_retrieve_context_on_empty_corpus() {
        let chunks: Vec<String> = Vec::new();
        assert!(retrieve_context("anything at all", &chunks, TOP_K).is_empty());
    }

    #[tokio::test]
    async fn test_answer_uses_corpus_context() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("context.txt");
        std::fs::write(&path, CORPUS).expect("write corpus");
        let (endpoint, seen) = echo_completion().await;

        let reply = assistant(path, endpoint)
            .answer("How many departures did Bengaluru handle?")
            .await;

        assert_eq!(
            reply,
            "User question: How many departures did Bengaluru handle?\n\n\
             Relevant context:\n\
             Bengaluru handled 412 departures last week.\n\
             Delhi handled 910 departures last week.\n\
             Morning arrivals at Bengaluru are mostly on time."
        );
        assert_eq!(seen.lock().expect("lock").len(), 1);
    }

    #[tokio::test]
    async fn test_answer_without_corpus_still_asks_the_model() {
        let dir = tempfile::tempdir().expect("tempdir");
        let (endpoint, _seen) = echo_completion().await;
        let assistant = assistant(dir.path().join("missing.txt"), endpoint);

        let reply = assistant.answer("Which airport is busier?").await;

        assert_eq!(
            reply,
            "User question: Which airport is busier?\n\nRelevant context:"
        );
        assert_eq!(assistant.corpus().state().await.label(), "unavailable");
    }

    #[tokio::test]
    async fn test_prepare_prompt_loads_lazily() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("context.txt");
        let addr = unreachable_addr().await;
        let endpoint = Url::parse(&format!("http://{addr}/chat/completions")).expect("url");
        let assistant = assistant(path.clone(), endpoint);

        let prompt = assistant.prepare_prompt("dashboard refresh").await;
        assert!(prompt.user.ends_with("Relevant context:\n"));

        std::fs::write(&path, CORPUS).expect("write corpus");
        let prompt = assistant.prepare_prompt("dashboard refresh").await;
        assert!(prompt
            .user
            .ends_with("Relevant context:\nThe dashboard refreshes daily."));
        assert_eq!(prompt.system, DEFAULT_SYSTEM_PROMPT);
    }

    #[tokio::test]
    async fn test_submit_displays_question_then_reply() {
        let dir = tempfile::tempdir().expect("tempdir");
        let addr = unreachable_addr().await;
        let endpoint = Url::parse(&format!("http://{addr}/chat/completions")).expect("url");
        let assistant = assistant(dir.path().join("context.txt"), endpoint);
        let sink = RecordingSink::default();

        let reply = assistant.submit("  Is DEL delayed?  ", &sink).await;

        assert_eq!(reply.as_deref(), Some(CONNECTIVITY_FAILURE_REPLY));
        assert_eq!(
            sink.entries(),
            vec![
                ("Is DEL delayed?".to_string(), Sender::User),
                (CONNECTIVITY_FAILURE_REPLY.to_string(), Sender::Bot),
            ]
        );

        // The pipeline stays usable after a failure.
        let again = assistant.submit("And BLR?", &sink).await;
        assert_eq!(again.as_deref(), Some(CONNECTIVITY_FAILURE_REPLY));
        assert_eq!(sink.entries().len(), 4);
    }

    #[tokio::test]
    async fn test_submit_ignores_blank_input() {
        let dir = tempfile::tempdir().expect("tempdir");
        let addr = unreachable_addr().await;
        let endpoint = Url::parse(&format!("http://{addr}/chat/completions")).expect("url");
        let assistant = assistant(dir.path().join("context.txt"), endpoint);
        let sink = RecordingSink::default();

        assert!(assistant.submit(" \n\t", &sink).await.is_none());
        assert!(sink.entries().is_empty());
        assert_eq!(assistant.corpus().state().await.label(), "not_attempted");
    }

    #[test]
    fn test_from_config_uses_custom_system_prompt() {
        let config = AppConfig {
            system_prompt: Some("Answer tersely.".into()),
            ..AppConfig::default()
        };

        let assistant = ChatAssistant::from_config(&config).expect("assistant");
        assert_eq!(assistant.system_prompt, "Answer tersely.");
        assert_eq!(
            assistant.corpus().source(),
            &CorpusSource::File(PathBuf::from("data/context.txt"))
        );
    }
}
