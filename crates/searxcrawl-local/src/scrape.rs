use searxcrawl_core::{Error, Result, ScrapeBackend, ScrapeRequest, ScrapeSource, Scraped};
use std::time::Instant;

use crate::clients::ExtractionBackend;

/// Unauthenticated GET with a browser-ish user agent. Returns the body as text.
#[derive(Debug, Clone)]
pub struct DirectFetcher {
    client: reqwest::Client,
}

impl DirectFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    pub async fn fetch(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Scrape(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(Error::Scrape(format!("HTTP {status}")));
        }
        resp.text().await.map_err(|e| Error::Scrape(e.to_string()))
    }
}

enum ExtractionAttempt {
    Served(String),
    Skipped,
    Failed(Error),
}

/// Firecrawl first when configured, then exactly one direct fetch.
#[derive(Debug, Clone)]
pub struct ContentRetriever {
    extraction: ExtractionBackend,
    direct: DirectFetcher,
}

impl ContentRetriever {
    pub fn new(extraction: ExtractionBackend, direct: DirectFetcher) -> Self {
        Self { extraction, direct }
    }

    pub fn extraction_enabled(&self) -> bool {
        self.extraction.is_configured()
    }

    async fn try_extraction(&self, url: &str) -> ExtractionAttempt {
        match &self.extraction {
            ExtractionBackend::Absent => ExtractionAttempt::Skipped,
            ExtractionBackend::Configured(fc) => match fc.scrape_markdown(url).await {
                Ok(md) => ExtractionAttempt::Served(md),
                Err(e) => ExtractionAttempt::Failed(e),
            },
        }
    }

    pub async fn retrieve(&self, url: &str) -> Result<Scraped> {
        let t0 = Instant::now();

        match self.try_extraction(url).await {
            ExtractionAttempt::Served(content) => {
                return Ok(Scraped {
                    content,
                    source: ScrapeSource::Extraction,
                })
            }
            ExtractionAttempt::Failed(e) => {
                tracing::warn!(url, error = %e, "firecrawl failed, falling back to direct fetch");
            }
            ExtractionAttempt::Skipped => {}
        }

        let content = self.direct.fetch(url).await?;
        tracing::debug!(
            url,
            elapsed_ms = t0.elapsed().as_millis() as u64,
            bytes = content.len(),
            "direct fetch ok"
        );
        Ok(Scraped {
            content,
            source: ScrapeSource::Direct,
        })
    }
}

#[async_trait::async_trait]
impl ScrapeBackend for ContentRetriever {
    async fn scrape(&self, req: &ScrapeRequest) -> Result<Scraped> {
        self.retrieve(&req.url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UpstreamClients;
    use axum::{
        http::{header, HeaderMap, StatusCode},
        response::Redirect,
        routing::{get, post},
        Json, Router,
    };
    use searxcrawl_core::Config;
    use serde_json::json;
    use std::net::SocketAddr;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    async fn serve(app: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }

    #[derive(Clone, Default)]
    struct Hits {
        scrape: Arc<AtomicUsize>,
        page: Arc<AtomicUsize>,
    }

    /// One fake host serving both the Firecrawl endpoint and the target page.
    async fn fake_upstreams(
        firecrawl_reply: serde_json::Value,
        firecrawl_status: StatusCode,
    ) -> (SocketAddr, Hits) {
        let hits = Hits::default();
        let app = Router::new()
            .route(
                "/scrape",
                post({
                    let hits = hits.clone();
                    move |_body: Json<serde_json::Value>| {
                        let hits = hits.clone();
                        let reply = firecrawl_reply.clone();
                        async move {
                            hits.scrape.fetch_add(1, Ordering::SeqCst);
                            (firecrawl_status, Json(reply))
                        }
                    }
                }),
            )
            .route(
                "/page",
                get({
                    let hits = hits.clone();
                    move |headers: HeaderMap| {
                        let hits = hits.clone();
                        async move {
                            hits.page.fetch_add(1, Ordering::SeqCst);
                            let ua = headers
                                .get(header::USER_AGENT)
                                .and_then(|v| v.to_str().ok())
                                .unwrap_or("")
                                .to_string();
                            let authed = headers.contains_key(header::AUTHORIZATION);
                            format!("<html>raw page ua={ua} authed={authed}</html>")
                        }
                    }
                }),
            )
            .route(
                "/missing",
                get(|| async { (StatusCode::NOT_FOUND, "gone") }),
            )
            .route("/moved", get(|| async { Redirect::temporary("/page") }));
        (serve(app).await, hits)
    }

    fn retriever(firecrawl: Option<SocketAddr>) -> ContentRetriever {
        let cfg = Config {
            firecrawl_url: firecrawl.map(|a| format!("http://{a}")),
            firecrawl_key: firecrawl.map(|_| "fc-key".to_string()),
            ..Config::default()
        };
        UpstreamClients::from_config(&cfg).unwrap().into_invokers().1
    }

    const RAW_PAGE: &str =
        "<html>raw page ua=Mozilla/5.0 (compatible; MCP-Server/1.0) authed=false</html>";

    #[tokio::test]
    async fn firecrawl_markdown_wins_without_direct_fetch() {
        let (addr, hits) = fake_upstreams(
            json!({"success": true, "data": {"markdown": "# Hi"}}),
            StatusCode::OK,
        )
        .await;
        let r = retriever(Some(addr));
        assert!(r.extraction_enabled());

        let s = r.retrieve(&format!("http://{addr}/page")).await.unwrap();
        assert_eq!(s.content, "# Hi");
        assert_eq!(s.source, ScrapeSource::Extraction);
        assert_eq!(hits.scrape.load(Ordering::SeqCst), 1);
        assert_eq!(hits.page.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn firecrawl_success_false_falls_back_once() {
        let (addr, hits) = fake_upstreams(
            json!({"success": false, "error": "blocked"}),
            StatusCode::OK,
        )
        .await;

        let s = retriever(Some(addr))
            .retrieve(&format!("http://{addr}/page"))
            .await
            .unwrap();
        assert_eq!(s.content, RAW_PAGE);
        assert_eq!(s.source, ScrapeSource::Direct);
        assert_eq!(hits.scrape.load(Ordering::SeqCst), 1);
        assert_eq!(hits.page.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn firecrawl_http_error_falls_back_once() {
        let (addr, hits) = fake_upstreams(
            json!({"error": "internal"}),
            StatusCode::INTERNAL_SERVER_ERROR,
        )
        .await;

        let s = retriever(Some(addr))
            .retrieve(&format!("http://{addr}/page"))
            .await
            .unwrap();
        assert_eq!(s.source, ScrapeSource::Direct);
        assert_eq!(hits.page.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn unreachable_firecrawl_falls_back() {
        let (addr, hits) = fake_upstreams(json!({}), StatusCode::OK).await;
        let dead = {
            let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            l.local_addr().unwrap()
        };

        let s = retriever(Some(dead))
            .retrieve(&format!("http://{addr}/page"))
            .await
            .unwrap();
        assert_eq!(s.content, RAW_PAGE);
        assert_eq!(hits.page.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn absent_firecrawl_only_fetches_directly() {
        let (addr, hits) = fake_upstreams(
            json!({"success": true, "data": {"markdown": "# never"}}),
            StatusCode::OK,
        )
        .await;
        let r = retriever(None);
        assert!(!r.extraction_enabled());

        let s = r.retrieve(&format!("http://{addr}/page")).await.unwrap();
        assert_eq!(s.content, RAW_PAGE);
        assert_eq!(hits.scrape.load(Ordering::SeqCst), 0);
        assert_eq!(hits.page.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn direct_fetch_follows_redirects() {
        let (addr, hits) = fake_upstreams(json!({}), StatusCode::OK).await;

        let s = retriever(None)
            .retrieve(&format!("http://{addr}/moved"))
            .await
            .unwrap();
        assert_eq!(s.content, RAW_PAGE);
        assert_eq!(s.source, ScrapeSource::Direct);
        assert_eq!(hits.page.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn direct_failure_is_terminal_scrape_error() {
        let (addr, _hits) = fake_upstreams(json!({"success": false}), StatusCode::OK).await;

        let err = retriever(Some(addr))
            .retrieve(&format!("http://{addr}/missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Scrape(_)));
        assert_eq!(err.to_string(), "Failed to scrape URL: HTTP 404 Not Found");
    }

    #[tokio::test]
    async fn malformed_url_is_a_scrape_error() {
        let err = retriever(None).retrieve("not a url").await.unwrap_err();
        assert!(matches!(err, Error::Scrape(_)));
    }
}
