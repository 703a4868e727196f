//! MCP (Model Context Protocol) server for beamer-tools.
//!
//! Exposes Codebeamer tracker operations as MCP tools over stdio or
//! streamable HTTP.

pub mod handlers;
pub mod http;
pub mod protocol;
pub mod server;
pub mod tools;
pub mod transport;

pub use handlers::ToolHandler;
pub use server::McpServer;
