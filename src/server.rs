//! MCP server exposing the search index over stdio.

use crate::tools::search::{SearchRequest, handle_search};
use crate::tools::{handle_index_status, handle_rebuild};
use crate::worker::SearchState;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, wrapper::Parameters},
    model::*,
    schemars::{self, JsonSchema, generate::SchemaSettings},
    tool, tool_handler, tool_router,
};
use std::sync::Arc;

/// MCP server for fuzzy documentation search
#[derive(Clone)]
pub struct DocSearchServer {
    /// Published corpus, cache and configuration
    state: Arc<SearchState>,

    /// Tool router for handling MCP tool calls
    tool_router: ToolRouter<Self>,
}

impl std::fmt::Debug for DocSearchServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocSearchServer")
            .field("state", &self.state)
            .finish()
    }
}

#[tool_router]
impl DocSearchServer {
    pub fn new(state: Arc<SearchState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    pub fn state(&self) -> &Arc<SearchState> {
        &self.state
    }

    #[tool(
        description = "Fuzzy search over the documentation. Tolerates typos and matches titles, headings, keywords, descriptions and section text. Returns documents ranked by relevance, each followed by its matching sections with anchor URLs.",
        input_schema = inline_schema_for_type::<SearchRequest>()
    )]
    async fn search(
        &self,
        Parameters(request): Parameters<SearchRequest>,
    ) -> std::result::Result<String, String> {
        handle_search(&self.state, request)
    }

    #[tool(
        description = "Re-read the documentation directory and rebuild the search index. Unchanged documents are reused from the fingerprint cache. Searches keep using the previous index until the new one is ready."
    )]
    async fn rebuild_index(&self) -> std::result::Result<String, String> {
        handle_rebuild(&self.state).await
    }

    #[tool(description = "Show how many documents and sections are indexed and the outcome of the last build.")]
    async fn index_status(&self) -> std::result::Result<String, String> {
        Ok(handle_index_status(&self.state))
    }
}

#[tool_handler]
impl ServerHandler for DocSearchServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo::new(ServerCapabilities::builder().enable_tools().build())
            .with_protocol_version(ProtocolVersion::V_2024_11_05)
            .with_server_info(Implementation::from_build_env())
            .with_instructions(
                "docsearch: fuzzy search over a Markdown/MDX documentation site. \
                 Use search to find pages and sections; results link to section anchors. \
                 Use rebuild_index after editing documents."
                    .to_string(),
            )
    }
}

/// Generate an inline JSON schema for MCP tools
///
/// Unlike rmcp's default `schema_for_type()`, this sets `inline_subschemas = true`
/// so clients see the request shape directly instead of `$ref` indirections.
pub fn inline_schema_for_type<T: JsonSchema>() -> Arc<JsonObject> {
    let mut settings = SchemaSettings::draft07();
    settings.transforms = vec![Box::new(schemars::transform::AddNullable::default())];
    settings.inline_subschemas = true;

    let generator = settings.into_generator();
    let schema = generator.into_root_schema_for::<T>();
    let object = match serde_json::to_value(schema) {
        Ok(serde_json::Value::Object(object)) => object,
        _ => JsonObject::default(),
    };

    Arc::new(object)
}
