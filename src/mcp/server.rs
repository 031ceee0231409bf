//! Tour guide MCP server implementation

use anyhow::Result;
use rmcp::{
    handler::server::{tool::ToolRouter, wrapper::Parameters},
    model::{CallToolResult, Content, ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt,
};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::info;

use bd_tour_guide::search::intent::MAX_COUNT;
use bd_tour_guide::{extract, QueryRequest, TourGuide};

/// Parameters for tour_query and tour_semantic_search
#[derive(Debug, Deserialize, JsonSchema)]
pub struct QueryParams {
    /// Travel question (e.g., "top 5 spots in Sylhet")
    #[schemars(description = "Natural language travel question about Bangladesh")]
    pub query: String,
    #[schemars(description = "Maximum number of places (overrides the count in the query)")]
    #[serde(default)]
    pub top_k: Option<usize>,
}

/// Parameters for tour_intent
#[derive(Debug, Deserialize, JsonSchema)]
pub struct IntentParams {
    #[schemars(description = "Natural language travel question")]
    pub query: String,
}

impl QueryParams {
    /// Clamp top_k to 1..=50; 0 means "use the query's own count".
    fn request(self) -> QueryRequest {
        QueryRequest {
            query: self.query,
            top_k: self.top_k.filter(|k| *k > 0).map(|k| k.min(MAX_COUNT)),
        }
    }
}

/// Tour guide MCP service
#[derive(Clone)]
pub struct TourService {
    guide: TourGuide,
    tool_router: ToolRouter<Self>,
}

impl TourService {
    pub fn new(guide: TourGuide) -> Self {
        Self {
            guide,
            tool_router: Self::tool_router(),
        }
    }
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    let output = serde_json::to_string_pretty(value).map_err(|e| {
        McpError::internal_error(format!("JSON serialization failed: {}", e), None)
    })?;
    Ok(CallToolResult::success(vec![Content::text(output)]))
}

#[tool_router]
impl TourService {
    /// Ranked suggestions with a tour guide reply
    #[tool(description = "Suggest Bangladeshi tourist places for a travel question. Detects the landmark, division or country-wide intent, ranks matching places and returns them with a friendly tour guide reply.")]
    async fn tour_query(
        &self,
        params: Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.guide.answer(&params.0.request()).await;
        json_result(&response)
    }

    /// Nearest places from the vector index
    #[tool(description = "Semantic search over described Bangladeshi tourist places using embeddings. Returns the nearest places with a tour guide reply.")]
    async fn tour_semantic_search(
        &self,
        params: Parameters<QueryParams>,
    ) -> Result<CallToolResult, McpError> {
        let response = self.guide.answer_semantic(&params.0.request()).await;
        json_result(&response)
    }

    /// Query intent only
    #[tool(description = "Show how a travel question is understood: location, location type, requested count and search keywords.")]
    async fn tour_intent(
        &self,
        params: Parameters<IntentParams>,
    ) -> Result<CallToolResult, McpError> {
        json_result(&extract(&params.0.query))
    }

    /// Dataset statistics
    #[tool(description = "Get tourist place dataset statistics: totals, counts by division and category, places with images and descriptions.")]
    async fn tour_stats(&self) -> Result<CallToolResult, McpError> {
        json_result(&self.guide.stats())
    }
}

#[tool_handler]
impl ServerHandler for TourService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Bangladesh tour guide MCP server. Suggests tourist places and answers travel questions.".to_string()
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }
}

/// Run the MCP server
pub async fn run_mcp_server(guide: TourGuide) -> Result<()> {
    use tokio::io::{stdin, stdout};

    info!(places = guide.store().len(), "starting MCP server on stdio");
    let service = TourService::new(guide);
    let transport = (stdin(), stdout());
    let server = service.serve(transport).await?;
    server.waiting().await?;

    Ok(())
}
