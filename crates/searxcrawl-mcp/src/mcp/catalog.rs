use rmcp::model::{JsonObject, Tool};
use serde_json::json;
use std::sync::Arc;

pub const SEARCH_TOOL: &str = "search";
pub const SCRAPE_TOOL: &str = "scrape";

/// The fixed tool catalog. Does not depend on which backends are configured.
pub fn catalog() -> Vec<Tool> {
    vec![search_tool(), scrape_tool()]
}

fn input_schema(v: serde_json::Value) -> Arc<JsonObject> {
    match v {
        serde_json::Value::Object(m) => Arc::new(m),
        _ => Arc::new(JsonObject::new()),
    }
}

fn search_tool() -> Tool {
    Tool::new(
        SEARCH_TOOL,
        "Search the web using SearXNG. Returns a list of search results with titles, URLs, and snippets.",
        input_schema(json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "categories": {
                    "type": "string",
                    "description": "Comma-separated list of categories (e.g., 'general,news,science')"
                },
                "engines": {
                    "type": "string",
                    "description": "Comma-separated list of search engines to use (e.g., 'google,duckduckgo')"
                },
                "language": {
                    "type": "string",
                    "description": "Language code (e.g., 'en', 'fr', 'de')"
                },
                "pageno": {
                    "type": "number",
                    "description": "Page number for pagination (default: 1)"
                },
                "time_range": {
                    "type": "string",
                    "enum": ["day", "month", "year"],
                    "description": "Filter results by time range"
                },
                "safesearch": {
                    "type": "number",
                    "enum": [0, 1, 2],
                    "description": "Safe search level: 0 = None, 1 = Moderate, 2 = Strict"
                }
            },
            "required": ["query"]
        })),
    )
}

fn scrape_tool() -> Tool {
    Tool::new(
        SCRAPE_TOOL,
        "Scrape content from a URL. Uses Firecrawl if configured, otherwise falls back to basic HTTP fetch.",
        input_schema(json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "The URL to scrape"
                }
            },
            "required": ["url"]
        })),
    )
}
