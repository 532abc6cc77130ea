mod common;

use ahash::AHashSet;
use assert2::{check, let_assert};
use common::{TestCorpus, faq_corpus};
use kbase_mcp::CorpusRecord;
use kbase_mcp::search::{CorpusIndex, DEFAULT_K, DEFAULT_THRESHOLD, tokenize};
use rstest::rstest;

/// Test: Asking a stored question verbatim returns that pair first when no other
/// pair has a keyword score above 1 (all scores on the similarity scale).
#[rstest]
#[case("Where can I find the deployment logs?", 1)]
#[case("What is the on-call rotation schedule?", 3)]
#[case("Who approves production access requests?", 5)]
#[tokio::test(flavor = "multi_thread")]
async fn verbatim_question_ranks_first(
    faq_corpus: TestCorpus,
    #[case] query: &str,
    #[case] expected_pair: usize,
) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();
    let results = index.search(query, DEFAULT_K, DEFAULT_THRESHOLD);

    let_assert!(Some(top) = results.first());
    check!(top.metadata.qa_pair_id == expected_pair, "results: {:?}", results);
    check!(top.document == query);
    check!(top.score == 1.0);
}

/// Test: Two pairs with the same question but different sources are both kept
/// and both retrieved.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn duplicate_questions_with_different_sources_are_retained(faq_corpus: TestCorpus) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();

    let results = index.search("How do I reset my password?", DEFAULT_K, DEFAULT_THRESHOLD);
    let top_two: Vec<_> = results
        .iter()
        .take(2)
        .map(|r| (r.metadata.qa_pair_id, r.metadata.source.as_str()))
        .collect();

    check!(top_two == vec![(0, "wiki"), (4, "helpdesk")]);
}

/// Test: Fused results never repeat a pair and never exceed k.
#[rstest]
#[case("password reset", 5)]
#[case("how do I find the logs", 3)]
#[case("the", 2)]
#[case("production access on-call", 1)]
#[tokio::test(flavor = "multi_thread")]
async fn search_results_are_unique_and_bounded(
    faq_corpus: TestCorpus,
    #[case] query: &str,
    #[case] k: usize,
) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();
    let results = index.search(query, k, 0.0);

    let ids: AHashSet<_> = results.iter().map(|r| r.metadata.qa_pair_id).collect();
    check!(ids.len() == results.len(), "duplicate pairs in {:?}", results);
    check!(results.len() <= k);
    check!(
        results.windows(2).all(|w| w[0].score >= w[1].score),
        "results not sorted: {:?}",
        results
    );
}

/// Test: Score ranges and thresholds hold for each strategy on its own.
#[rstest]
#[case("How do I reset my password?")]
#[case("deployment logs dashboard")]
#[case("why")]
#[tokio::test(flavor = "multi_thread")]
async fn strategy_scores_respect_bounds(faq_corpus: TestCorpus, #[case] query: &str) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();

    for result in index.similarity_search(query, 100, 0.0) {
        check!((0.0..=1.0).contains(&result.score));
    }
    for result in index.similarity_search(query, 2, 0.3) {
        check!(result.score >= 0.3);
    }
    check!(index.similarity_search(query, 2, 0.0).len() <= 2);

    for result in index.keyword_search(query, 100) {
        check!(result.score > 0.0);
    }
}

/// Test: Stored tokens are exactly the tokenized question text.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stored_tokens_match_question(faq_corpus: TestCorpus) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();
    check!(!index.is_empty());
    for doc in index.all() {
        check!(doc.tokens() == tokenize(doc.question()).as_slice());
    }
}

/// Test: Ids follow original row positions, so skipped rows leave gaps.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ids_keep_row_positions(faq_corpus: TestCorpus) {
    let index = faq_corpus.knowledge_base().index().await.unwrap();
    let ids: Vec<_> = index.all().iter().map(|d| d.id()).collect();
    check!(ids == vec!["qa_0", "qa_1", "qa_3", "qa_4", "qa_5"]);

    let_assert!(Some(unsourced) = index.all().iter().find(|d| d.qa_pair_id() == 5));
    check!(unsourced.source() == "unknown");
}

/// Test: Fusion re-sorts raw scores, so a keyword score above 1 outranks a
/// verbatim similarity match at 1.0.
#[test]
fn keyword_score_above_one_outranks_verbatim_match() {
    let index = CorpusIndex::build(vec![
        CorpusRecord::new("reset password", "Use the self-service portal.", Some("wiki")),
        CorpusRecord::new(
            "How can I reset password access for contractors in the staging cluster?",
            "Ask an admin to reset password access via the console.",
            Some("runbook"),
        ),
    ]);

    let results = index.search("reset password", DEFAULT_K, DEFAULT_THRESHOLD);
    let ranking: Vec<_> = results
        .iter()
        .map(|r| (r.metadata.qa_pair_id, r.score))
        .collect();

    check!(ranking.len() == 2);
    check!(ranking[0].0 == 1);
    check!((ranking[0].1 - 1.1).abs() < 1e-9);
    check!(ranking[1] == (0, 1.0));
}

#[test]
fn short_question_is_excluded() {
    let index = CorpusIndex::build(vec![CorpusRecord::new("short", "irrelevant text here", None)]);
    check!(index.is_empty());
    check!(index.stats().skipped == 1);
}

#[test]
fn single_document_matches_paraphrase() {
    let index = CorpusIndex::build(vec![CorpusRecord::new(
        "How do I reset my password?",
        "Go to settings and click reset.",
        Some("wiki"),
    )]);

    let results = index.search("how to reset password", 5, 0.3);
    check!(results.len() == 1);
    check!(results[0].score > 0.0);
}

#[test]
fn empty_corpus_returns_nothing() {
    let index = CorpusIndex::build(Vec::new());
    check!(index.search("How do I reset my password?", DEFAULT_K, 0.0).is_empty());
    check!(index.keyword_search("password", DEFAULT_K).is_empty());
}
