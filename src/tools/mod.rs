pub mod ask;
pub mod search;
pub mod stats;

pub use ask::*;
pub use search::*;
pub use stats::*;

/// Shortens `text` to at most `max_chars` characters on a char boundary.
pub(crate) fn excerpt(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", text[..cut].trim_end()),
        None => text.to_string(),
    }
}
