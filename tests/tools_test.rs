mod common;

use assert2::{check, let_assert};
use common::{TempWorkspace, TestCorpus, faq_assistant, faq_corpus};
use kbase_mcp::tools::{
    AskRequest, SearchRequest, StatsRequest, handle_ask, handle_knowledge_stats, handle_search,
};
use kbase_mcp::{Assistant, AssistantSettings, Config, KnowledgeServer};
use rmcp::ServerHandler;
use rstest::rstest;
use std::sync::Arc;

fn search_request(query: &str) -> SearchRequest {
    SearchRequest {
        query: query.to_string(),
        limit: None,
        threshold: None,
    }
}

/// Test: The ask tool answers from the top result and cites sources.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ask_answers_with_sources(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;
    let request = AskRequest {
        question: "How do I reset my password?".to_string(),
        thread_context: None,
    };

    let_assert!(Ok(answer) = handle_ask(&assistant, request).await);
    check!(answer.contains("Open Settings, choose Security, then click Reset password."));
    check!(answer.ends_with("Sources: wiki, helpdesk"), "answer: {}", answer);
}

/// Test: Unrelated questions get the fallback naming the contact.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ask_without_matches_falls_back(faq_corpus: TestCorpus) {
    let settings = AssistantSettings {
        contact: "#ask-platform".to_string(),
        ..AssistantSettings::default()
    };
    let assistant = Assistant::new(faq_corpus.knowledge_base(), settings);
    let request = AskRequest {
        question: "banana smoothie recipe".to_string(),
        thread_context: None,
    };

    let answer = handle_ask(&assistant, request).await.unwrap();
    check!(answer.contains("couldn't find relevant information"));
    check!(answer.contains("#ask-platform"));
    check!(!answer.contains("Sources:"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn ask_rejects_blank_question(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;
    let request = AskRequest {
        question: "   ".to_string(),
        thread_context: Some("Bot: hi".to_string()),
    };
    check!(handle_ask(&assistant, request).await.is_err());
}

/// Test: The search tool lists ranked hits with source and score.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_lists_ranked_hits(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;

    let output = handle_search(
        assistant.knowledge_base(),
        assistant.settings(),
        search_request("Where can I find the deployment logs?"),
    )
    .await
    .unwrap();

    check!(output.starts_with("Search results for 'Where can I find the deployment logs?'"));
    check!(output.contains("1. Where can I find the deployment logs? [runbook] - score: 1.000"));
    check!(output.contains("observability dashboard"));
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn search_reports_no_results(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;
    let output = handle_search(
        assistant.knowledge_base(),
        assistant.settings(),
        search_request("banana smoothie"),
    )
    .await
    .unwrap();
    check!(output.starts_with("No results found for 'banana smoothie'"));
}

#[rstest]
#[case(Some(0), None)]
#[case(None, Some(1.5))]
#[case(None, Some(-0.2))]
#[tokio::test(flavor = "multi_thread")]
async fn search_rejects_bad_parameters(
    faq_assistant: (TestCorpus, Assistant),
    #[case] limit: Option<usize>,
    #[case] threshold: Option<f64>,
) {
    let (_corpus, assistant) = faq_assistant;
    let request = SearchRequest {
        query: "password".to_string(),
        limit,
        threshold,
    };
    check!(
        handle_search(assistant.knowledge_base(), assistant.settings(), request)
            .await
            .is_err()
    );
}

/// Test: Stats report the index counts and an optional preview.
#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn stats_with_preview(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;

    let output = handle_knowledge_stats(assistant.knowledge_base(), StatsRequest { preview: Some(2) })
        .await
        .unwrap();

    check!(output.contains("• Q&A pairs indexed: 5"));
    check!(output.contains("• Records skipped: 1"));
    check!(output.contains("• Unique sources: 5"));
    check!(output.contains("First 2 Q&A pairs:"));
    check!(output.contains("qa_0 [wiki] How do I reset my password?"));
    check!(!output.contains("qa_3"));
}

/// Test: Tools report an unusable corpus instead of panicking.
#[tokio::test(flavor = "multi_thread")]
async fn tools_report_load_failure() {
    let corpus = TestCorpus::write("broken.csv", "title\nnothing\n");
    let assistant = Assistant::new(corpus.knowledge_base(), AssistantSettings::default());

    let_assert!(
        Err(message) = handle_knowledge_stats(assistant.knowledge_base(), StatsRequest::default()).await
    );
    check!(message.contains("Knowledge base unavailable"));

    let answer = assistant.answer("How do I reset my password?", None).await;
    check!(answer.contains("trouble accessing the knowledge base"));
}

/// Test: A config file is enough to build a working assistant.
#[tokio::test(flavor = "multi_thread")]
async fn assistant_from_config() {
    let workspace = TempWorkspace::new();
    let corpus = workspace.create_file("faq.csv", common::FAQ_CSV);
    let config_path = workspace.create_file(
        "config.toml",
        &format!(
            "[corpus]\npath = {:?}\n\n[retrieval]\nk = 2\n\n[generator]\nenabled = false\n",
            corpus.display().to_string()
        ),
    );

    let config = Config::load_from(&config_path).unwrap();
    let assistant = Assistant::from_config(&config).unwrap();
    check!(assistant.settings().k == 2);

    let answer = assistant.answer("Who approves production access requests?", None).await;
    check!(answer.contains("approved by the platform team lead"));
    check!(answer.ends_with("Sources: unknown"), "answer: {}", answer);
}

#[test]
fn assistant_from_config_requires_corpus() {
    check!(Assistant::from_config(&Config::default()).is_err());
}

#[rstest]
fn server_advertises_tools(faq_assistant: (TestCorpus, Assistant)) {
    let (_corpus, assistant) = faq_assistant;
    let server = KnowledgeServer::new(Arc::new(assistant));

    let info = server.get_info();
    check!(info.capabilities.tools.is_some());
    let_assert!(Some(instructions) = info.instructions);
    check!(instructions.contains("knowledge_stats"));
}
