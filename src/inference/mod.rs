//! Inference endpoint integration
//!
//! The backend trait, the streaming Ollama client, and a scripted mock used by
//! tests.

pub mod backend;
pub mod error;
mod mock;
pub mod ndjson;
pub mod ollama;
pub mod types;

pub use backend::{ChunkStream, InferenceBackend};
pub use error::InferenceError;
pub use mock::{MockInference, MockResponse};
pub use ollama::OllamaClient;
pub use types::{GenerateRequest, GenerationParams, StreamUnit};
