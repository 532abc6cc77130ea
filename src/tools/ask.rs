//! Question answering handler.

use crate::assistant::Assistant;
use rmcp::schemars;
use serde::Deserialize;

#[derive(Debug, Deserialize, schemars::JsonSchema)]
pub struct AskRequest {
    /// The question to answer from the knowledge base
    pub question: String,
    /// Earlier messages of the conversation, one per line (e.g. "User (Sam): ..." / "Bot: ...")
    #[serde(default)]
    pub thread_context: Option<String>,
}

/// Answers a question. Only a blank question is an error; everything else yields a reply.
pub async fn handle_ask(assistant: &Assistant, request: AskRequest) -> Result<String, String> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err("Question must not be empty".to_string());
    }

    Ok(assistant
        .answer(question, request.thread_context.as_deref())
        .await)
}
