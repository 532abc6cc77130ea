//! Fusion of the similarity and keyword result lists.
//!
//! The two strategies score on different scales. Fusion does not rescale them:
//! similarity hits are listed first, duplicates are resolved in favour of the
//! first occurrence, and the survivors are re-sorted by raw score. Treat the
//! output as a ranking only.

use ahash::AHashSet;

use super::document::ScoredResult;
use super::index::{CorpusIndex, rank};

/// Default number of results returned to callers.
pub const DEFAULT_K: usize = 5;

/// Default similarity threshold on the primary query path.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

impl CorpusIndex {
    /// Runs both strategies and returns at most `k` deduplicated results, best first.
    ///
    /// An empty result means the knowledge base has nothing relevant.
    pub fn search(&self, query: &str, k: usize, threshold: f64) -> Vec<ScoredResult<'_>> {
        let similar = self.similarity_search(query, k, threshold);
        let keyword = self.keyword_search(query, k);

        tracing::debug!(
            "Search '{}': {} similarity hits, {} keyword hits",
            query,
            similar.len(),
            keyword.len()
        );

        fuse(similar, keyword, k)
    }
}

/// Concatenates, deduplicates by `qa_pair_id` (first wins) and ranks.
pub fn fuse<'a>(
    similar: Vec<ScoredResult<'a>>,
    keyword: Vec<ScoredResult<'a>>,
    k: usize,
) -> Vec<ScoredResult<'a>> {
    let mut seen = AHashSet::with_capacity(similar.len() + keyword.len());
    let mut merged: Vec<_> = similar
        .into_iter()
        .chain(keyword)
        .filter(|result| seen.insert(result.metadata.qa_pair_id))
        .collect();

    rank(&mut merged, k);
    merged
}
