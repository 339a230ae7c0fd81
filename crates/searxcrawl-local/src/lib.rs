//! reqwest-backed upstream clients for `searxcrawl`.
//!
//! - [`clients`] builds the three HTTP clients from a [`searxcrawl_core::Config`]
//! - [`search`] talks to SearXNG
//! - [`firecrawl`] talks to the optional Firecrawl extraction service
//! - [`scrape`] chains Firecrawl and a direct fetch into one retriever

pub mod clients;
pub mod firecrawl;
pub mod scrape;
pub mod search;

pub use clients::{ExtractionBackend, UpstreamClients};
pub use firecrawl::FirecrawlClient;
pub use scrape::{ContentRetriever, DirectFetcher};
pub use search::{search_params, SearxngClient};

/// Join a base URL and an endpoint path, accepting a base that already ends in the path.
pub(crate) fn endpoint_for(base: &str, path: &str) -> String {
    let mut out = base.trim().trim_end_matches('/').to_string();
    if !out.ends_with(path) {
        out.push_str(path);
    }
    out
}

/// Pull a human-readable message out of an upstream error body (`{"error": "..."}`).
pub(crate) fn upstream_error_message(body: &str) -> Option<String> {
    let v: serde_json::Value = serde_json::from_str(body).ok()?;
    match v.get("error")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Object(o) => o
            .get("message")
            .and_then(|m| m.as_str())
            .map(|s| s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_for_accepts_base_or_full_endpoint() {
        assert_eq!(
            endpoint_for("http://localhost:8888", "/search"),
            "http://localhost:8888/search"
        );
        assert_eq!(
            endpoint_for("http://localhost:8888/", "/search"),
            "http://localhost:8888/search"
        );
        assert_eq!(
            endpoint_for("http://localhost:8888/search/", "/search"),
            "http://localhost:8888/search"
        );
        assert_eq!(
            endpoint_for("http://fc:3002/v1", "/scrape"),
            "http://fc:3002/v1/scrape"
        );
    }

    #[test]
    fn upstream_error_message_reads_string_or_nested_message() {
        assert_eq!(
            upstream_error_message(r#"{"error":"rate limited"}"#).as_deref(),
            Some("rate limited")
        );
        assert_eq!(
            upstream_error_message(r#"{"error":{"message":"bad key"}}"#).as_deref(),
            Some("bad key")
        );
        assert!(upstream_error_message(r#"{"error":""}"#).is_none());
        assert!(upstream_error_message("<html>502</html>").is_none());
        assert!(upstream_error_message(r#"{"detail":"x"}"#).is_none());
    }
}
