use std::{
    fmt,
    path::PathBuf,
    sync::{Arc, LazyLock},
};

use common::{error::AppError, utils::config::AppConfig};
use regex::Regex;
use reqwest::header::{CACHE_CONTROL, PRAGMA};
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};
use url::Url;

use crate::tokenize::{is_space, SPACE_CLASS};

/// Where the reference text lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CorpusSource {
    Remote(Url),
    File(PathBuf),
}

impl CorpusSource {
    /// Resolves `corpus_path` against `corpus_base_url` the way a browser resolves a
    /// relative link; without a base URL the path is read from disk.
    pub fn from_config(config: &AppConfig) -> Result<Self, AppError> {
        match config.corpus_base_url.as_deref() {
            Some(base) => {
                let base = Url::parse(base)?;
                Ok(Self::Remote(base.join(&config.corpus_path)?))
            }
            None => Ok(Self::File(PathBuf::from(&config.corpus_path))),
        }
    }
}

impl fmt::Display for CorpusSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorpusSource::Remote(url) => write!(f, "{url}"),
            CorpusSource::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Why no corpus is available. Never shown to the user.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CorpusUnavailable {
    #[error("corpus request failed: {0}")]
    Transport(String),
    #[error("corpus source responded with status {0}")]
    Status(u16),
    #[error("corpus file could not be read: {0}")]
    Io(String),
    #[error("corpus source contained no sentences")]
    Empty,
}

/// Sentence-level chunks of the reference text, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Corpus {
    chunks: Vec<String>,
}

impl Corpus {
    pub fn from_text(text: &str) -> Self {
        Self {
            chunks: split_sentences(text),
        }
    }

    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

#[allow(clippy::expect_used)]
static SENTENCE_BREAK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[.?!][{SPACE_CLASS}]+")).expect("sentence break pattern compiles")
});

/// Splits text at whitespace runs that directly follow `.`, `?` or `!`.
///
/// The terminal punctuation stays with the preceding piece. Pieces are trimmed and
/// empty pieces dropped.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for found in SENTENCE_BREAK.find_iter(text) {
        // The terminal is a single ASCII byte.
        let cut = found.start() + 1;
        pieces.push(&text[start..cut]);
        start = found.end();
    }
    pieces.push(&text[start..]);

    pieces
        .into_iter()
        .map(|piece| piece.trim_matches(is_space))
        .filter(|piece| !piece.is_empty())
        .map(str::to_owned)
        .collect()
}

async fn read_source(
    client: &reqwest::Client,
    source: &CorpusSource,
) -> Result<String, CorpusUnavailable> {
    match source {
        CorpusSource::Remote(url) => {
            let response = client
                .get(url.clone())
                .header(CACHE_CONTROL, "no-store")
                .header(PRAGMA, "no-cache")
                .send()
                .await
                .map_err(|e| CorpusUnavailable::Transport(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(CorpusUnavailable::Status(status.as_u16()));
            }

            response
                .text()
                .await
                .map_err(|e| CorpusUnavailable::Transport(e.to_string()))
        }
        CorpusSource::File(path) => {
            let bytes = tokio::fs::read(path)
                .await
                .map_err(|e| CorpusUnavailable::Io(e.to_string()))?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
    }
}

/// Fetches the reference text (bypassing caches) and splits it into chunks.
pub async fn fetch_corpus(
    client: &reqwest::Client,
    source: &CorpusSource,
) -> Result<Corpus, CorpusUnavailable> {
    let text = read_source(client, source).await?;
    let corpus = Corpus::from_text(&text);
    if corpus.is_empty() {
        return Err(CorpusUnavailable::Empty);
    }
    Ok(corpus)
}

/// Soft-failing load: any failure yields an empty chunk list.
pub async fn load_corpus(client: &reqwest::Client, source: &CorpusSource) -> Vec<String> {
    match fetch_corpus(client, source).await {
        Ok(corpus) => corpus.chunks,
        Err(reason) => {
            debug!(%source, %reason, "Corpus load degraded to empty");
            Vec::new()
        }
    }
}

#[derive(Debug, Clone)]
pub enum CorpusState {
    NotAttempted,
    Ready(Arc<Corpus>),
    Unavailable(CorpusUnavailable),
}

impl CorpusState {
    /// Chunks available for scoring; empty unless the corpus is ready.
    pub fn chunks(&self) -> &[String] {
        match self {
            CorpusState::Ready(corpus) => corpus.chunks(),
            CorpusState::NotAttempted | CorpusState::Unavailable(_) => &[],
        }
    }

    pub const fn is_ready(&self) -> bool {
        matches!(self, CorpusState::Ready(_))
    }

    pub const fn label(&self) -> &'static str {
        match self {
            CorpusState::NotAttempted => "not_attempted",
            CorpusState::Ready(_) => "ready",
            CorpusState::Unavailable(_) => "unavailable",
        }
    }
}

/// Session-scoped holder of the corpus.
///
/// The loader is the only writer and always replaces the whole value. Loads are
/// serialized through `load_lock`, which doubles as the readiness signal: a question
/// arriving while a load is in flight waits for it instead of scoring an empty corpus.
pub struct CorpusStore {
    client: reqwest::Client,
    source: CorpusSource,
    reload_when_unavailable: bool,
    state: RwLock<CorpusState>,
    load_lock: Mutex<()>,
}

impl CorpusStore {
    pub fn new(
        client: reqwest::Client,
        source: CorpusSource,
        reload_when_unavailable: bool,
    ) -> Self {
        Self {
            client,
            source,
            reload_when_unavailable,
            state: RwLock::new(CorpusState::NotAttempted),
            load_lock: Mutex::new(()),
        }
    }

    pub fn from_config(client: reqwest::Client, config: &AppConfig) -> Result<Self, AppError> {
        Ok(Self::new(
            client,
            CorpusSource::from_config(config)?,
            config.reload_corpus_when_empty,
        ))
    }

    pub fn source(&self) -> &CorpusSource {
        &self.source
    }

    /// Current state without waiting for any in-flight load.
    pub async fn state(&self) -> CorpusState {
        self.state.read().await.clone()
    }

    /// Waits for any in-flight load, then loads if nothing usable is held yet.
    pub async fn ready(&self) -> CorpusState {
        if let CorpusState::Ready(corpus) = &*self.state.read().await {
            return CorpusState::Ready(Arc::clone(corpus));
        }

        let _guard = self.load_lock.lock().await;
        let current = self.state().await;
        match current {
            CorpusState::Ready(_) => current,
            CorpusState::NotAttempted => self.load_locked().await,
            CorpusState::Unavailable(_) if self.reload_when_unavailable => {
                self.load_locked().await
            }
            CorpusState::Unavailable(_) => current,
        }
    }

    /// Explicit reload; replaces whatever is held, even a ready corpus.
    pub async fn reload(&self) -> CorpusState {
        let _guard = self.load_lock.lock().await;
        self.load_locked().await
    }

    async fn load_locked(&self) -> CorpusState {
        let next = match fetch_corpus(&self.client, &self.source).await {
            Ok(corpus) => {
                info!(source = %self.source, chunks = corpus.len(), "Corpus loaded");
                CorpusState::Ready(Arc::new(corpus))
            }
            Err(reason) => {
                warn!(
                    source = %self.source,
                    %reason,
                    "Corpus unavailable, answering without context"
                );
                CorpusState::Unavailable(reason)
            }
        };

        *self.state.write().await = next.clone();
        next
    }
}
