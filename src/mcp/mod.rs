//! MCP server for the tour guide
//!
//! Exposes query, semantic search, intent and dataset statistics as tools.

mod server;

pub use server::run_mcp_server;
