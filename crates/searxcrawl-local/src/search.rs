use searxcrawl_core::{Error, Result, SearchProvider, SearchRequest};
use std::time::Instant;

use crate::{endpoint_for, upstream_error_message};

/// Query parameters for `GET /search`.
///
/// `q` and `format=json` always come first; optional fields are appended only when
/// present. Empty strings and `pageno=0` count as absent so no blank parameters reach
/// upstream. `safesearch=0` is a real level and is sent.
pub fn search_params(req: &SearchRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![("q", req.query.clone()), ("format", "json".to_string())];

    let text = |v: &Option<String>| v.as_deref().filter(|s| !s.is_empty()).map(str::to_string);
    if let Some(v) = text(&req.categories) {
        params.push(("categories", v));
    }
    if let Some(v) = text(&req.engines) {
        params.push(("engines", v));
    }
    if let Some(v) = text(&req.language) {
        params.push(("language", v));
    }
    if let Some(n) = req.pageno.filter(|n| *n > 0) {
        params.push(("pageno", n.to_string()));
    }
    if let Some(t) = req.time_range {
        params.push(("time_range", t.as_str().to_string()));
    }
    if let Some(s) = req.safesearch {
        params.push(("safesearch", s.level().to_string()));
    }
    params
}

#[derive(Debug, Clone)]
pub struct SearxngClient {
    client: reqwest::Client,
    base_url: String,
}

impl SearxngClient {
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
        endpoint_for(&self.base_url, "/search")
    }

    /// One GET, no retry. The upstream body is returned as-is.
    pub async fn search(&self, req: &SearchRequest) -> Result<serde_json::Value> {
        req.validate()?;
        let t0 = Instant::now();

        let resp = self
            .client
            .get(self.endpoint())
            .query(&search_params(req))
            .send()
            .await
            .map_err(|e| Error::Search(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(Error::Search(
                upstream_error_message(&body).unwrap_or_else(|| format!("HTTP {status}")),
            ));
        }

        // Upstream's result schema is trusted; only "is it JSON" is checked.
        let body: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| Error::Search(format!("malformed response: {e}")))?;

        tracing::debug!(
            elapsed_ms = t0.elapsed().as_millis() as u64,
            results = body
                .get("results")
                .and_then(|r| r.as_array())
                .map(|a| a.len())
                .unwrap_or(0),
            "searxng search ok"
        );
        Ok(body)
    }
}

#[async_trait::async_trait]
impl SearchProvider for SearxngClient {
    fn name(&self) -> &'static str {
        "searxng"
    }

    async fn search(&self, req: &SearchRequest) -> Result<serde_json::Value> {
        SearxngClient::search(self, req).await
    }
}
