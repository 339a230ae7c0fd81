use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use searxcrawl_core::{Config, SafeSearch, SearchRequest, SearchResults, TimeRange};
use searxcrawl_local::UpstreamClients;
use std::fmt::Write as _;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "searxcrawl")]
#[command(about = "SearXNG search + Firecrawl scrape (MCP stdio server)", long_about = None)]
struct Cli {
    /// KEY=VALUE file loaded before reading config. Never overrides the process env.
    #[arg(long, env = "SEARXCRAWL_ENV_FILE", global = true)]
    env_file: Option<PathBuf>,
    /// Runs the MCP stdio server when omitted.
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run as an MCP stdio server (for MCP clients).
    #[cfg(feature = "stdio")]
    McpStdio,
    /// Run one search against SearXNG and print the result.
    Search(SearchCmd),
    /// Scrape one URL (Firecrawl if configured, else direct fetch) and print the content.
    Scrape(ScrapeCmd),
    /// Print version info.
    Version(VersionCmd),
}

#[derive(clap::Args, Debug)]
struct SearchCmd {
    /// Search query (multiple words are joined with spaces).
    #[arg(required = true, num_args = 1..)]
    query: Vec<String>,
    /// Comma-separated categories, e.g. general,news.
    #[arg(long)]
    categories: Option<String>,
    /// Comma-separated engines, e.g. google,duckduckgo.
    #[arg(long)]
    engines: Option<String>,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    pageno: Option<u32>,
    /// day|month|year
    #[arg(long)]
    time_range: Option<TimeRange>,
    /// 0 (none), 1 (moderate) or 2 (strict)
    #[arg(long)]
    safesearch: Option<SafeSearch>,
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

#[derive(clap::Args, Debug)]
struct ScrapeCmd {
    url: String,
}

#[derive(clap::Args, Debug)]
struct VersionCmd {
    /// Output format: json|text
    #[arg(long = "output", alias = "format", default_value = "json")]
    output: String,
}

fn init_tracing(default_directive: &str) {
    // stdout belongs to the MCP transport; diagnostics go to stderr.
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_directive));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[cfg(feature = "stdio")]
fn default_command() -> Result<Commands> {
    Ok(Commands::McpStdio)
}

#[cfg(not(feature = "stdio"))]
fn default_command() -> Result<Commands> {
    anyhow::bail!("built without the `stdio` feature; pass a subcommand (see --help)")
}

#[cfg(feature = "stdio")]
async fn run_stdio(cfg: &Config) -> Result<()> {
    tracing::info!("SearXNG + Firecrawl MCP Server");
    tracing::info!("SearXNG URL: {}", cfg.searxng_url);
    tracing::info!(
        "Firecrawl: {}",
        if cfg.firecrawl_enabled() {
            "Enabled"
        } else {
            "Disabled (using fallback)"
        }
    );

    let clients = UpstreamClients::from_config(cfg).context("building upstream clients")?;
    let dispatcher = searxcrawl::mcp::Dispatcher::from_clients(clients);
    searxcrawl::mcp::serve_stdio(dispatcher)
        .await
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;
    Ok(())
}

fn render_search_text(body: &serde_json::Value) -> Result<String> {
    let r = SearchResults::from_value(body)?;
    let mut out = String::new();
    writeln!(
        out,
        "{} ({} results)",
        r.query,
        r.number_of_results.max(r.results.len() as f64) as u64
    )?;
    for (i, hit) in r.results.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, hit.title)?;
        writeln!(out, "   {}", hit.url)?;
        if let Some(c) = hit.content.as_deref().filter(|c| !c.trim().is_empty()) {
            writeln!(out, "   {}", c.trim())?;
        }
    }
    if !r.suggestions.is_empty() {
        let s: Vec<String> = r
            .suggestions
            .iter()
            .map(|v| v.as_str().map(str::to_string).unwrap_or_else(|| v.to_string()))
            .collect();
        writeln!(out, "suggestions: {}", s.join(", "))?;
    }
    Ok(out)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(p) = cli.env_file.as_deref() {
        dotenvy::from_path(p).with_context(|| format!("loading env file {}", p.display()))?;
    }

    let command = match cli.command {
        Some(c) => c,
        None => default_command()?,
    };

    let default_directive = match command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => "info",
        _ => "warn",
    };
    init_tracing(default_directive);

    // Read once; everything downstream receives this value.
    let cfg = Config::from_env();
    tracing::debug!(config = ?cfg, "configuration loaded");

    match command {
        #[cfg(feature = "stdio")]
        Commands::McpStdio => run_stdio(&cfg).await?,
        Commands::Search(args) => {
            let req = SearchRequest {
                query: args.query.join(" "),
                categories: args.categories,
                engines: args.engines,
                language: args.language,
                pageno: args.pageno,
                time_range: args.time_range,
                safesearch: args.safesearch,
            };
            let clients = UpstreamClients::from_config(&cfg)?;
            let body = clients.search.search(&req).await?;
            match args.output.to_ascii_lowercase().as_str() {
                "text" => print!("{}", render_search_text(&body)?),
                _ => println!("{}", serde_json::to_string_pretty(&body)?),
            }
        }
        Commands::Scrape(args) => {
            let (_, retriever) = UpstreamClients::from_config(&cfg)?.into_invokers();
            let scraped = retriever.retrieve(&args.url).await?;
            tracing::info!(source = scraped.source.as_str(), "scraped");
            println!("{}", scraped.content);
        }
        Commands::Version(args) => {
            let v = serde_json::json!({
                "name": "searxcrawl",
                "version": env!("CARGO_PKG_VERSION"),
            });
            match args.output.to_ascii_lowercase().as_str() {
                "text" => println!("searxcrawl {}", env!("CARGO_PKG_VERSION")),
                _ => println!("{}", v),
            }
        }
    }

    Ok(())
}
