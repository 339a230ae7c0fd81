use crate::{Error, Result};
use std::fmt;

pub const DEFAULT_SEARXNG_URL: &str = "http://localhost:8888";

const SEARXNG_URL: &str = "SEARXNG_URL";
const SEARXNG_KEY: &str = "SEARXNG_KEY";
const FIRECRAWL_URL: &str = "FIRECRAWL_URL";
const FIRECRAWL_KEY: &str = "FIRECRAWL_KEY";

/// Upstream endpoints and credentials, read once at startup.
///
/// `firecrawl_url` doubles as the on/off switch for the extraction path.
#[derive(Clone, PartialEq, Eq)]
pub struct Config {
    pub searxng_url: String,
    pub searxng_key: Option<String>,
    pub firecrawl_url: Option<String>,
    pub firecrawl_key: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            searxng_url: DEFAULT_SEARXNG_URL.to_string(),
            searxng_key: None,
            firecrawl_url: None,
            firecrawl_key: None,
        }
    }
}

// Keys must never reach logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn redact(v: &Option<String>) -> &'static str {
            if v.is_some() {
                "<set>"
            } else {
                "<unset>"
            }
        }
        f.debug_struct("Config")
            .field("searxng_url", &self.searxng_url)
            .field("searxng_key", &redact(&self.searxng_key))
            .field("firecrawl_url", &self.firecrawl_url)
            .field("firecrawl_key", &redact(&self.firecrawl_key))
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Build from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |k: &str| {
            lookup(k)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        Self {
            searxng_url: get(SEARXNG_URL).unwrap_or_else(|| DEFAULT_SEARXNG_URL.to_string()),
            searxng_key: get(SEARXNG_KEY),
            firecrawl_url: get(FIRECRAWL_URL),
            firecrawl_key: get(FIRECRAWL_KEY),
        }
    }

    pub fn firecrawl_enabled(&self) -> bool {
        self.firecrawl_url.is_some()
    }

    /// Both base URLs must be absolute http(s) URLs.
    pub fn validate(&self) -> Result<()> {
        check_base_url(SEARXNG_URL, &self.searxng_url)?;
        if let Some(u) = self.firecrawl_url.as_deref() {
            check_base_url(FIRECRAWL_URL, u)?;
        }
        Ok(())
    }
}

fn check_base_url(var: &str, raw: &str) -> Result<()> {
    let u = url::Url::parse(raw).map_err(|e| Error::Config(format!("{var}={raw:?}: {e}")))?;
    match u.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "{var}={raw:?}: unsupported scheme {other:?}"
        ))),
    }
}
