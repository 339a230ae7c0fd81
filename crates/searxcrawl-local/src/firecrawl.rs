use serde::Deserialize;
use searxcrawl_core::{Error, Result};
use std::time::Instant;

use crate::{endpoint_for, upstream_error_message};

/// Client for a Firecrawl-compatible `POST /scrape` endpoint.
///
/// Auth and content-type headers live on the inner client (see `clients`).
#[derive(Debug, Clone)]
pub struct FirecrawlClient {
    client: reqwest::Client,
    base_url: String,
}

impl FirecrawlClient {
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim().to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self) -> String {
        endpoint_for(&self.base_url, "/scrape")
    }

    /// Ask Firecrawl for markdown. Anything short of `success=true` with non-empty
    /// markdown is an [`Error::Extraction`].
    pub async fn scrape_markdown(&self, url: &str) -> Result<String> {
        let t0 = Instant::now();
        let body = serde_json::json!({
            "url": url,
            "formats": ["markdown"],
        });

        let resp = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Extraction(e.to_string()))?;
        if !status.is_success() {
            return Err(Error::Extraction(
                upstream_error_message(&text).unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }

        let parsed: FirecrawlScrapeResponse =
            serde_json::from_str(&text).map_err(|e| Error::Extraction(e.to_string()))?;
        if !parsed.success {
            return Err(Error::Extraction(
                parsed
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "success=false".to_string()),
            ));
        }
        let markdown = parsed
            .data
            .and_then(|d| d.markdown)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| Error::Extraction("response had no markdown".to_string()))?;

        tracing::debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = markdown.len(),
            "firecrawl scrape ok"
        );
        Ok(markdown)
    }
}

#[derive(Debug, Deserialize)]
struct FirecrawlScrapeResponse {
    #[serde(default)]
    success: bool,
    data: Option<FirecrawlScrapeData>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FirecrawlScrapeData {
    markdown: Option<String>,
}
