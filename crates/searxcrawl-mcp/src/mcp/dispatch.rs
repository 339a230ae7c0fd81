use rmcp::model::{CallToolResult, JsonObject, Tool};
use searxcrawl_core::{
    Error, Result, ScrapeBackend, ScrapeRequest, SearchProvider, SearchRequest,
};
use searxcrawl_local::UpstreamClients;
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;

use super::catalog::{catalog, SCRAPE_TOOL, SEARCH_TOOL};
use super::envelope::{tool_error, tool_text};

/// Routes tool calls to the search and scrape invokers.
///
/// `invoke` never fails: every error becomes an error-flagged [`CallToolResult`].
pub struct Dispatcher {
    tools: Vec<Tool>,
    search: Arc<dyn SearchProvider>,
    scrape: Arc<dyn ScrapeBackend>,
}

impl Dispatcher {
    pub fn new(search: Arc<dyn SearchProvider>, scrape: Arc<dyn ScrapeBackend>) -> Self {
        Self {
            tools: catalog(),
            search,
            scrape,
        }
    }

    pub fn from_clients(clients: UpstreamClients) -> Self {
        let (search, retriever) = clients.into_invokers();
        Self::new(Arc::new(search), Arc::new(retriever))
    }

    pub fn list(&self) -> Vec<Tool> {
        self.tools.clone()
    }

    pub async fn invoke(&self, name: &str, arguments: Option<JsonObject>) -> CallToolResult {
        let t0 = Instant::now();
        let out = match self.route(name, arguments).await {
            Ok(text) => tool_text(text),
            Err(e) => {
                tracing::debug!(tool = name, error = %e, "tool call failed");
                tool_error(&e)
            }
        };
        tracing::debug!(
            tool = name,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            is_error = out.is_error.unwrap_or(false),
            "tool call"
        );
        out
    }

    async fn route(&self, name: &str, arguments: Option<JsonObject>) -> Result<String> {
        match name {
            SEARCH_TOOL => {
                let req: SearchRequest = parse_args(arguments)?;
                tracing::debug!(provider = self.search.name(), query = %req.query, "searching");
                let body = self.search.search(&req).await?;
                serde_json::to_string_pretty(&body).map_err(|e| Error::Search(e.to_string()))
            }
            SCRAPE_TOOL => {
                let req: ScrapeRequest = parse_args(arguments)?;
                let scraped = self.scrape.scrape(&req).await?;
                tracing::debug!(url = %req.url, source = scraped.source.as_str(), "scraped");
                Ok(scraped.content)
            }
            other => Err(Error::UnknownTool(other.to_string())),
        }
    }
}

fn parse_args<T: DeserializeOwned>(arguments: Option<JsonObject>) -> Result<T> {
    serde_json::from_value(serde_json::Value::Object(arguments.unwrap_or_default()))
        .map_err(|e| Error::InvalidArguments(e.to_string()))
}
