//! MCP surface: the tool catalog, the dispatcher, and the rmcp stdio adapter.

use rmcp::{
    model::{
        CallToolRequestParam, CallToolResult, ListToolsResult, PaginatedRequestParam,
        ServerCapabilities, ServerInfo,
    },
    service::RequestContext,
    transport::stdio,
    ErrorData as McpError, RoleServer, ServiceExt,
};
use std::sync::Arc;

mod catalog;
mod dispatch;
mod envelope;

pub use catalog::{catalog, SCRAPE_TOOL, SEARCH_TOOL};
pub use dispatch::Dispatcher;
pub use envelope::{is_error, result_text};

/// rmcp handler. `tools/list` and `tools/call` go straight to the [`Dispatcher`].
#[derive(Clone)]
pub struct SearxcrawlMcp {
    dispatcher: Arc<Dispatcher>,
}

impl SearxcrawlMcp {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

impl rmcp::ServerHandler for SearxcrawlMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(
                "Web search via SearXNG (`search`) and page retrieval via Firecrawl with a direct-fetch fallback (`scrape`)."
                    .to_string(),
            ),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(self.dispatcher.list()))
    }

    // Failures travel in the result's error flag, never as protocol errors.
    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        Ok(self
            .dispatcher
            .invoke(&request.name, request.arguments)
            .await)
    }
}

pub async fn serve_stdio(dispatcher: Dispatcher) -> Result<(), McpError> {
    let running = SearxcrawlMcp::new(dispatcher)
        .serve(stdio())
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    tracing::info!("Server running on stdio");
    // Keep the stdio server alive until the client closes.
    running
        .waiting()
        .await
        .map_err(|e| McpError::internal_error(e.to_string(), None))?;
    Ok(())
}
