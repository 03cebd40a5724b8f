//! Top-level error taxonomy
//!
//! Every failure the CLI or the MCP server can report funnels into
//! [`AnalyzerError`]. The one non-fatal condition, a response without a
//! corrected Dockerfile, is not an error and never appears here.

use crate::inference::InferenceError;
use crate::prompt::PromptError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// Input Dockerfile does not exist
    #[error("Dockerfile not found at {}", .0.display())]
    InputNotFound(PathBuf),

    /// Input exists but cannot be read as UTF-8 text
    #[error("Cannot read Dockerfile {}: {source}", path.display())]
    InputUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Template(#[from] PromptError),

    #[error(transparent)]
    Inference(#[from] InferenceError),

    /// Externally supplied file name is not a plain file name
    #[error("Invalid file name '{0}': must be a plain file name without path components")]
    InvalidName(String),

    /// Saved artifact does not exist in either managed directory
    #[error("File not found: {0}")]
    NotFound(String),

    /// Output directory or file could not be written
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Saved artifact exists but could not be read back
    #[error("Failed to read {}: {source}", path.display())]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// User interrupted the analysis before the stream completed
    #[error("Analysis interrupted before the response completed")]
    Interrupted,
}

impl AnalyzerError {
    /// Stable machine-readable name, used in structured payloads
    pub fn kind(&self) -> &'static str {
        match self {
            AnalyzerError::InputNotFound(_) => "InputNotFound",
            AnalyzerError::InputUnreadable { .. } => "InputUnreadable",
            AnalyzerError::Template(e) => e.kind(),
            AnalyzerError::Inference(e) => e.kind(),
            AnalyzerError::InvalidName(_) => "InvalidName",
            AnalyzerError::NotFound(_) => "NotFound",
            AnalyzerError::WriteFailed { .. } => "WriteFailed",
            AnalyzerError::ReadFailed { .. } => "ReadFailed",
            AnalyzerError::Interrupted => "Interrupted",
        }
    }

    /// Troubleshooting hints for the CLI, empty when there is nothing to add
    pub fn help_message(&self) -> String {
        match self {
            AnalyzerError::InputNotFound(path) => format!(
                "Help: Check that the path is correct:\n\
                - Path given: {}\n\
                - Relative paths resolve against the current directory",
                path.display()
            ),
            AnalyzerError::Template(PromptError::TemplateNotFound { available, .. }) => {
                format!("Help: Use --prompt with one of: {}", available)
            }
            AnalyzerError::Template(PromptError::Unreadable { path, .. }) => format!(
                "Help: Check permissions on {} or remove it from prompts_dir to use the built-in template",
                path.display()
            ),
            AnalyzerError::Inference(InferenceError::EndpointUnreachable { endpoint, .. }) => {
                format!(
                    "Help: Cannot connect to Ollama at {}. Try:\n\
                    1. Install Ollama: https://ollama.ai/\n\
                    2. Start Ollama: ollama serve\n\
                    3. Point OLLAMA_HOST at the right host if it runs elsewhere",
                    endpoint
                )
            }
            AnalyzerError::Inference(InferenceError::Timeout { seconds }) => format!(
                "Help: The model took too long to answer. Try:\n\
                - Increase timeout: --timeout {}\n\
                - Try a smaller model with --model",
                (seconds * 2).min(600)
            ),
            AnalyzerError::Inference(InferenceError::ModelNotFound { model }) => format!(
                "Help: The model is not available locally. Try:\n\
                - Pull it: ollama pull {}\n\
                - List installed models: ollama list",
                model
            ),
            AnalyzerError::Inference(
                InferenceError::IncompleteStream { .. } | InferenceError::MalformedChunk { .. },
            ) => "Help: The response was cut off or garbled; nothing was saved. Retry the analysis."
                .to_string(),
            AnalyzerError::WriteFailed { .. } => {
                "Help: Check permissions or pick another location with --output-dir".to_string()
            }
            _ => String::new(),
        }
    }
}
