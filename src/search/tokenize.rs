//! Text tokenization for question matching.
//!
//! Tokens are plain lowercase words. There is no stemming and no stop-word list:
//! short words are dropped by length alone, which already removes most of the
//! noise ("a", "is", "to", "do", "my") in short question texts.

use regex::Regex;
use std::sync::LazyLock;

/// Tokens with this many characters or fewer are discarded.
const MAX_DROPPED_TOKEN_LENGTH: usize = 2;

/// Anything that is neither a word character nor whitespace.
static NON_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("NON_WORD pattern is a valid regex"));

/// Splits text into lowercase word tokens.
///
/// Punctuation is replaced by spaces before splitting, so `"password?"` and
/// `"e-mail"` become `["password"]` and `["mail"]` (the `"e"` fragment is too short).
/// Order and duplicates are preserved; scorers convert to sets where needed.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    let cleaned = NON_WORD.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .filter(|token| token.chars().count() > MAX_DROPPED_TOKEN_LENGTH)
        .map(str::to_owned)
        .collect()
}
