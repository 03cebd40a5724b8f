//! MCP tool server over stdio
//!
//! Exposes `analyze_dockerfile`, `list_analyses` and `get_analysis` as tools
//! every saved artifact as a `dockerfile-ai://` resource, and two canned
//! prompts that point a client at those tools.

pub mod payload;
pub mod prompts;
pub mod resources;
pub mod server;

pub use server::DockerfileAiServer;
