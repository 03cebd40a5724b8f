//! dockerfile-ai - AI-powered Dockerfile review backed by a local Ollama model
//!
//! A Dockerfile is wrapped in a versioned prompt template and sent to Ollama's
//! streaming `/api/generate` endpoint. The reply is shown as it arrives, then
//! split into a narrative critique and a corrected Dockerfile (the first fenced
//! block whose content starts with `FROM`). Both parts are saved under a
//! timestamped name, and the saved files can be listed and read back.
//!
//! # Core Concepts
//!
//! - **Inference backends**: [`InferenceBackend`] streams text chunks; the
//!   production implementation is [`OllamaClient`], tests use [`MockInference`]
//! - **Analysis**: [`Analyzer`] composes the prompt, drains the stream into a
//!   [`ChunkSink`], and splits the full reply into an [`AnalysisResult`]
//! - **Storage**: [`ArtifactWriter`] saves results all-or-nothing,
//!   [`ArtifactCatalog`] lists and reads them with path-traversal protection
//! - **Surfaces**: the `dockerfile-ai` CLI and the `dockerfile-ai-mcp` server
//!   both drive [`AnalysisService`]
//!
//! # Example Usage
//!
//! ```no_run
//! use dockerfile_ai::{AnalysisService, AnalyzeOptions, AnalyzerConfig, NullSink};
//! use std::path::Path;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let service = AnalysisService::from_config(AnalyzerConfig::default())?;
//! let outcome = service
//!     .analyze_file(Path::new("Dockerfile"), &AnalyzeOptions::default(), &mut NullSink)
//!     .await?;
//!
//! println!("{}", outcome.result.narrative);
//! if let Some(fixed) = &outcome.result.corrected_dockerfile {
//!     println!("{}", fixed);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # Project Structure
//!
//! - [`inference`]: streaming Ollama client and mock backend
//! - [`prompt`]: prompt templates
//! - [`analysis`]: pipeline and response splitting
//! - [`storage`]: saving, listing and reading artifacts
//! - [`mcp`]: MCP tools and resources

pub mod analysis;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod inference;
pub mod mcp;
pub mod prompt;
pub mod service;
pub mod storage;
pub mod util;

pub use analysis::{
    split_response, AnalysisRequest, AnalysisResult, Analyzer, ChunkSink, CollectingSink,
    NullSink,
};
pub use config::{AnalyzerConfig, ConfigError, ConfigOverrides};
pub use error::AnalyzerError;
pub use inference::{InferenceBackend, InferenceError, MockInference, OllamaClient};
pub use prompt::PromptLibrary;
pub use service::{AnalysisOutcome, AnalysisService, AnalyzeOptions};
pub use storage::{ArtifactCatalog, ArtifactWriter, SavedArtifacts};
pub use util::{init_logging, LoggingConfig};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
