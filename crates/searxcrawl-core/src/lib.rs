use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

mod config;

pub use config::{Config, DEFAULT_SEARXNG_URL};

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("SearXNG search failed: {0}")]
    Search(String),
    #[error("Failed to scrape URL: {0}")]
    Scrape(String),
    #[error("Firecrawl scrape failed: {0}")]
    Extraction(String),
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("invalid arguments: {0}")]
    InvalidArguments(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, Error>;

/// SearXNG `time_range` filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeRange {
    Day,
    Month,
    Year,
}

impl TimeRange {
    pub const ALL: [TimeRange; 3] = [TimeRange::Day, TimeRange::Month, TimeRange::Year];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Month => "month",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(Error::InvalidArguments(format!(
                "time_range must be one of day|month|year, got {other:?}"
            ))),
        }
    }
}

/// SearXNG `safesearch` level. Travels as the integers 0, 1 and 2.
///
/// Integral floats (`1.0`) are accepted on input since JSON clients may send them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "u8")]
pub enum SafeSearch {
    Off,
    Moderate,
    Strict,
}

impl SafeSearch {
    pub const ALL: [SafeSearch; 3] = [SafeSearch::Off, SafeSearch::Moderate, SafeSearch::Strict];

    pub fn level(self) -> u8 {
        match self {
            Self::Off => 0,
            Self::Moderate => 1,
            Self::Strict => 2,
        }
    }
}

impl TryFrom<u8> for SafeSearch {
    type Error = Error;

    fn try_from(v: u8) -> Result<Self> {
        match v {
            0 => Ok(Self::Off),
            1 => Ok(Self::Moderate),
            2 => Ok(Self::Strict),
            n => Err(Error::InvalidArguments(format!(
                "safesearch must be 0, 1 or 2, got {n}"
            ))),
        }
    }
}

impl TryFrom<f64> for SafeSearch {
    type Error = Error;

    fn try_from(v: f64) -> Result<Self> {
        let n = whole_number(v, u8::MAX.into()).map_err(|_| {
            Error::InvalidArguments(format!("safesearch must be 0, 1 or 2, got {v}"))
        })?;
        Self::try_from(n as u8)
    }
}

impl From<SafeSearch> for u8 {
    fn from(s: SafeSearch) -> u8 {
        s.level()
    }
}

impl FromStr for SafeSearch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let n: u8 = s.trim().parse().map_err(|_| {
            Error::InvalidArguments(format!("safesearch must be 0, 1 or 2, got {s:?}"))
        })?;
        Self::try_from(n)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Comma-separated categories, e.g. `general,news`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<String>,
    /// Comma-separated engine names, e.g. `google,duckduckgo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engines: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(
        default,
        deserialize_with = "integral_pageno",
        skip_serializing_if = "Option::is_none"
    )]
    pub pageno: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_range: Option<TimeRange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub safesearch: Option<SafeSearch>,
}

/// Accepts `2` and `2.0`; rejects fractions, negatives and anything above `max`.
fn whole_number(v: f64, max: f64) -> std::result::Result<u64, String> {
    if !v.is_finite() || v.fract() != 0.0 || v < 0.0 || v > max {
        return Err(format!("expected a whole number between 0 and {max}, got {v}"));
    }
    Ok(v as u64)
}

fn integral_pageno<'de, D>(d: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<f64>::deserialize(d)?
        .map(|v| whole_number(v, u32::MAX.into()).map(|n| n as u32))
        .transpose()
        .map_err(|e| serde::de::Error::custom(format!("pageno: {e}")))
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.query.trim().is_empty() {
            return Err(Error::InvalidArguments(
                "query must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// One SearXNG result row. Only the fields we render are typed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchHit {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default)]
    pub score: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default, rename = "publishedDate")]
    pub published_date: Option<String>,
}

/// Typed view over a SearXNG `format=json` body.
///
/// The tool path never goes through this type: it returns the upstream body
/// verbatim. This view exists for human-facing rendering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResults {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub number_of_results: f64,
    #[serde(default)]
    pub results: Vec<SearchHit>,
    #[serde(default)]
    pub answers: Vec<serde_json::Value>,
    #[serde(default)]
    pub corrections: Vec<serde_json::Value>,
    #[serde(default)]
    pub infoboxes: Vec<serde_json::Value>,
    #[serde(default)]
    pub suggestions: Vec<serde_json::Value>,
}

impl SearchResults {
    pub fn from_value(v: &serde_json::Value) -> Result<Self> {
        serde_json::from_value(v.clone()).map_err(|e| Error::Search(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeRequest {
    pub url: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ScrapeSource {
    Extraction,
    Direct,
}

impl ScrapeSource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Extraction => "firecrawl",
            Self::Direct => "direct",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scraped {
    pub content: String,
    pub source: ScrapeSource,
}

#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &'static str;
    /// Returns the upstream body unchanged.
    async fn search(&self, req: &SearchRequest) -> Result<serde_json::Value>;
}

#[async_trait::async_trait]
pub trait ScrapeBackend: Send + Sync {
    async fn scrape(&self, req: &ScrapeRequest) -> Result<Scraped>;
}
