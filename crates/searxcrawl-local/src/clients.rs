use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use searxcrawl_core::{Config, Error, Result};
use std::time::Duration;

use crate::firecrawl::FirecrawlClient;
use crate::scrape::{ContentRetriever, DirectFetcher};
use crate::search::SearxngClient;

pub const SEARCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);
pub const DIRECT_FETCH_TIMEOUT: Duration = Duration::from_secs(15);

pub const SEARCH_USER_AGENT: &str = "SearXNG-MCP-Server/1.0";
pub const DIRECT_USER_AGENT: &str = "Mozilla/5.0 (compatible; MCP-Server/1.0)";

/// Whether the optional extraction service is wired in.
#[derive(Debug, Clone)]
pub enum ExtractionBackend {
    Configured(FirecrawlClient),
    Absent,
}

impl ExtractionBackend {
    pub fn is_configured(&self) -> bool {
        matches!(self, Self::Configured(_))
    }
}

/// Every upstream handle the server needs. Read-only once built.
#[derive(Debug, Clone)]
pub struct UpstreamClients {
    pub search: SearxngClient,
    pub extraction: ExtractionBackend,
    pub direct: DirectFetcher,
}

impl UpstreamClients {
    pub fn from_config(cfg: &Config) -> Result<Self> {
        cfg.validate()?;

        let search = SearxngClient::new(search_http(cfg.searxng_key.as_deref())?, &cfg.searxng_url);
        let extraction = match cfg.firecrawl_url.as_deref() {
            Some(base) => ExtractionBackend::Configured(FirecrawlClient::new(
                extraction_http(cfg.firecrawl_key.as_deref())?,
                base,
            )),
            None => ExtractionBackend::Absent,
        };
        let direct = DirectFetcher::new(direct_http()?);

        Ok(Self {
            search,
            extraction,
            direct,
        })
    }

    /// Split into the two invokers the dispatcher routes to.
    pub fn into_invokers(self) -> (SearxngClient, ContentRetriever) {
        (
            self.search,
            ContentRetriever::new(self.extraction, self.direct),
        )
    }
}

fn bearer(key: &str) -> Result<HeaderValue> {
    let mut v = HeaderValue::from_str(&format!("Bearer {key}"))
        .map_err(|e| Error::Config(format!("API key is not a valid header value: {e}")))?;
    v.set_sensitive(true);
    Ok(v)
}

fn search_http(key: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    if let Some(k) = key {
        headers.insert(AUTHORIZATION, bearer(k)?);
    }
    reqwest::Client::builder()
        .user_agent(SEARCH_USER_AGENT)
        .default_headers(headers)
        .timeout(SEARCH_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(e.to_string()))
}

fn extraction_http(key: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(k) = key {
        headers.insert(AUTHORIZATION, bearer(k)?);
    }
    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(EXTRACTION_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(e.to_string()))
}

fn direct_http() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(DIRECT_USER_AGENT)
        .timeout(DIRECT_FETCH_TIMEOUT)
        .build()
        .map_err(|e| Error::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_is_absent_without_firecrawl_url() {
        let c = UpstreamClients::from_config(&Config::default()).unwrap();
        assert!(!c.extraction.is_configured());
        assert_eq!(c.search.base_url(), searxcrawl_core::DEFAULT_SEARXNG_URL);
    }

    #[test]
    fn extraction_is_configured_with_firecrawl_url() {
        let cfg = Config {
            firecrawl_url: Some("http://127.0.0.1:3002".to_string()),
            firecrawl_key: Some("fc-key".to_string()),
            ..Config::default()
        };
        let c = UpstreamClients::from_config(&cfg).unwrap();
        match &c.extraction {
            ExtractionBackend::Configured(fc) => {
                assert_eq!(fc.base_url(), "http://127.0.0.1:3002")
            }
            ExtractionBackend::Absent => panic!("expected firecrawl to be configured"),
        }
    }

    #[test]
    fn keys_that_cannot_be_headers_fail_construction() {
        let cfg = Config {
            searxng_key: Some("line\nbreak".to_string()),
            ..Config::default()
        };
        assert!(matches!(
            UpstreamClients::from_config(&cfg),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn invalid_base_url_fails_construction() {
        let cfg = Config {
            searxng_url: "::nope".to_string(),
            ..Config::default()
        };
        assert!(matches!(
            UpstreamClients::from_config(&cfg),
            Err(Error::Config(_))
        ));
    }
}
