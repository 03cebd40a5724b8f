//! Inference error types
//!
//! Every failure at the network/inference boundary maps onto one of these
//! variants. None of them are retried; they surface to the caller as-is.

use thiserror::Error;

/// Errors that can occur while talking to the inference endpoint
#[derive(Debug, Clone, Error, PartialEq)]
pub enum InferenceError {
    /// Connection refused, DNS failure, or similar
    #[error("Cannot reach inference endpoint at {endpoint}: {message}")]
    EndpointUnreachable { endpoint: String, message: String },

    /// Request exceeded the configured wall-clock timeout (in seconds)
    #[error("Request timed out after {seconds} seconds")]
    Timeout { seconds: u64 },

    /// A streamed unit could not be decoded
    #[error("Malformed chunk from inference endpoint: {message} (line: {line})")]
    MalformedChunk { line: String, message: String },

    /// Endpoint returned an error status or an error payload
    #[error("Inference API error{}: {message}", .status.map(|s| format!(" ({})", s)).unwrap_or_default())]
    Api {
        status: Option<u16>,
        message: String,
    },

    /// The requested model is not available on the endpoint
    #[error("Model '{model}' not found. Pull it with: ollama pull {model}")]
    ModelNotFound { model: String },

    /// Body ended before a unit signalled completion
    #[error("Response stream ended before completion ({received} chunks received)")]
    IncompleteStream { received: usize },

    /// Stream completed but produced no text
    #[error("Inference endpoint returned an empty response")]
    EmptyResponse,

    /// Other transport-level failure
    #[error("Network error: {message}")]
    Network { message: String },
}

impl InferenceError {
    /// Stable machine-readable name for structured payloads
    pub fn kind(&self) -> &'static str {
        match self {
            InferenceError::EndpointUnreachable { .. } => "EndpointUnreachable",
            InferenceError::Timeout { .. } => "Timeout",
            InferenceError::MalformedChunk { .. } => "MalformedChunk",
            InferenceError::Api { .. } => "ApiError",
            InferenceError::ModelNotFound { .. } => "ModelNotFound",
            InferenceError::IncompleteStream { .. } => "IncompleteStream",
            InferenceError::EmptyResponse => "EmptyResponse",
            InferenceError::Network { .. } => "NetworkError",
        }
    }
}
