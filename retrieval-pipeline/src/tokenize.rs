use std::sync::LazyLock;

use regex::Regex;

/// Low-information words excluded from query and chunk terms.
pub const STOPWORDS: &[&str] = &[
    "the", "and", "for", "are", "with", "that", "this", "your", "from", "was", "were", "have",
    "has", "had", "not", "but", "its", "can", "will", "would", "could", "a", "an", "of", "to",
    "in", "on", "at", "by", "or", "as", "it", "be", "is", "am", "we", "our", "they", "them",
    "their", "there", "here", "than", "then", "over", "under", "into", "out", "about", "also",
    "any", "all", "more", "most", "some", "such", "if", "so",
];

/// Tokens of this length or shorter never carry relevance.
const MIN_TOKEN_LEN_EXCLUSIVE: usize = 2;

pub fn is_stopword(token: &str) -> bool {
    STOPWORDS.contains(&token)
}

/// Regex class body for the characters that separate terms and sentences: ASCII
/// whitespace, the space separators, the line and paragraph separators and the byte
/// order mark. NEL (U+0085) is not a separator.
pub(crate) const SPACE_CLASS: &str = r"\t\n\x0B\x0C\r \x{A0}\x{1680}\x{2000}-\x{200A}\x{2028}\x{2029}\x{202F}\x{205F}\x{3000}\x{FEFF}";

/// Same set as [`SPACE_CLASS`], for trimming.
pub(crate) const fn is_space(ch: char) -> bool {
    matches!(
        ch,
        '\t' | '\n'
            | '\u{0B}'
            | '\u{0C}'
            | '\r'
            | ' '
            | '\u{A0}'
            | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}'
            | '\u{2029}'
            | '\u{202F}'
            | '\u{205F}'
            | '\u{3000}'
            | '\u{FEFF}'
    )
}

#[allow(clippy::expect_used)]
static NON_TERM_CHAR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("[^A-Za-z0-9_{SPACE_CLASS}]")).expect("term character class compiles")
});

/// Normalizes text into the term list used for relevance scoring.
///
/// - lowercase
/// - every character that is neither `[A-Za-z0-9_]` nor whitespace becomes a space
/// - split on whitespace runs
/// - drop tokens of length <= 2 and stopwords
///
/// Repeated terms are kept; callers decide whether repetition matters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let normalized = NON_TERM_CHAR.replace_all(&lowered, " ");

    normalized
        .split(is_space)
        .filter(|token| token.len() > MIN_TOKEN_LEN_EXCLUSIVE && !is_stopword(token))
        .map(str::to_owned)
        .collect()
}
