use std::collections::HashSet;

use crate::tokenize::tokenize;

/// Number of chunks forwarded to the completion service.
pub const TOP_K: usize = 3;

/// A chunk paired with its term-overlap score.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkScore<'a> {
    pub chunk: &'a str,
    pub score: usize,
}

/// Scores every chunk against the query tokens.
///
/// Each query token counts once per occurrence, so a term repeated in the question
/// adds one point per repetition when the chunk contains it.
pub fn score_chunks<'a, S>(query_tokens: &[String], chunks: &'a [S]) -> Vec<ChunkScore<'a>>
where
    S: AsRef<str>,
{
    chunks
        .iter()
        .map(|chunk| {
            let chunk = chunk.as_ref();
            let terms: HashSet<String> = tokenize(chunk).into_iter().collect();
            let score = query_tokens
                .iter()
                .filter(|token| terms.contains(token.as_str()))
                .count();
            ChunkScore { chunk, score }
        })
        .collect()
}

/// Keeps chunks with a positive score, highest first, at most `k` of them.
///
/// The sort is stable, so equal scores keep their corpus order.
pub fn rank_chunks(mut scored: Vec<ChunkScore<'_>>, k: usize) -> Vec<ChunkScore<'_>> {
    scored.retain(|entry| entry.score > 0);
    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored.truncate(k);
    scored
}

/// The chunks selected as context for one question, best first. May be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PromptContext {
    chunks: Vec<String>,
}

impl PromptContext {
    pub fn chunks(&self) -> &[String] {
        &self.chunks
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    /// Newline-joined chunks; empty string when nothing was selected.
    pub fn to_context_text(&self) -> String {
        self.chunks.join("\n")
    }
}

impl From<Vec<ChunkScore<'_>>> for PromptContext {
    fn from(ranked: Vec<ChunkScore<'_>>) -> Self {
        Self {
            chunks: ranked.into_iter().map(|entry| entry.chunk.to_owned()).collect(),
        }
    }
}
