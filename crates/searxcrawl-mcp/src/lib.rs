//! `searxcrawl` crate (library surface).
//!
//! The primary entrypoint is the `searxcrawl` binary (MCP stdio server + CLI).
//! The library exposes the tool dispatcher so it can be embedded or driven directly.

pub use searxcrawl_core as core;
pub use searxcrawl_local as local;

#[cfg(feature = "stdio")]
pub mod mcp;
