//! MCP server exposing the knowledge base as tools.

use crate::assistant::Assistant;
use crate::tools::ask::{AskRequest, handle_ask};
use crate::tools::search::{SearchRequest, handle_search};
use crate::tools::stats::{StatsRequest, handle_knowledge_stats};
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server answering questions from a Q&A knowledge base
#[derive(Clone)]
pub struct KnowledgeServer {
    /// Shared assistant (knowledge base, generator, retrieval settings)
    assistant: Arc<Assistant>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for KnowledgeServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeServer")
            .field("assistant", &self.assistant)
            .finish()
    }
}

#[tool_router]
impl KnowledgeServer {
    pub fn new(assistant: Arc<Assistant>) -> Self {
        Self {
            assistant,
            tool_router: Self::tool_router(),
        }
    }

    pub fn assistant(&self) -> &Arc<Assistant> {
        &self.assistant
    }

    #[tool(
        description = "Answer a question from the team knowledge base. Retrieves the most relevant Q&A pairs, phrases an answer from them and lists the source documents. Pass earlier messages as thread_context for follow-up questions.",
        input_schema = inline_schema_for_type::<AskRequest>()
    )]
    async fn ask(
        &self,
        Parameters(request): Parameters<AskRequest>,
    ) -> std::result::Result<String, String> {
        handle_ask(&self.assistant, request).await
    }

    #[tool(
        description = "Search the knowledge base without generating an answer. Combines token-overlap similarity with keyword matching and returns ranked Q&A pairs with their source and score.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(
            self.assistant.knowledge_base(),
            self.assistant.settings(),
            request,
        )
        .await
    }

    #[tool(
        description = "Show knowledge base statistics: records read, Q&A pairs indexed, records skipped and distinct sources. Optionally previews the first indexed pairs.",
        input_schema = inline_schema_for_type::<StatsRequest>()
    )]
    async fn knowledge_stats(
        &self,
        Parameters(request): Parameters<StatsRequest>,
    ) -> std::result::Result<String, String> {
        handle_knowledge_stats(self.assistant.knowledge_base(), request).await
    }
}

#[tool_handler]
impl ServerHandler for KnowledgeServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "kbase-mcp: answers questions from a curated Q&A knowledge base. \
                 Use ask for a phrased answer with sources, search to inspect raw matches, \
                 and knowledge_stats to check what is loaded.",
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Sets `inline_subschemas = true` so clients see flat parameter objects instead
/// of `$ref` indirections.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();

    let json_object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        Ok(_) | Err(_) => {
            tracing::error!("Tool schema did not serialize to an object");
            JsonObject::new()
        }
    };

    Arc::new(json_object)
}
