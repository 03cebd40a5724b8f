//! Inference backend abstraction
//!
//! A backend turns a [`GenerateRequest`] into a lazy, finite, non-restartable
//! sequence of text chunks. Consumers pull chunks until `Ok(None)`; display and
//! accumulation are the caller's business, not the backend's.

use super::error::InferenceError;
use super::types::GenerateRequest;
use async_trait::async_trait;

/// A stream of generated text chunks in arrival order
#[async_trait]
pub trait ChunkStream: Send {
    /// Returns the next chunk, `Ok(None)` once the endpoint signalled completion
    ///
    /// After an error or `Ok(None)` the stream must not be polled again.
    async fn next_chunk(&mut self) -> Result<Option<String>, InferenceError>;
}

/// Core trait for inference providers
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Opens one streaming generation request
    async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<Box<dyn ChunkStream>, InferenceError>;

    /// Human-readable backend name
    fn name(&self) -> &str;

    /// Optional model/endpoint description for logging
    fn model_info(&self) -> Option<String> {
        None
    }
}
