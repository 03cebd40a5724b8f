//! Dockerfile analysis: streaming orchestration and response splitting

pub mod pipeline;
pub mod sink;
pub mod splitter;
pub mod types;

pub use pipeline::Analyzer;
pub use sink::{ChunkSink, CollectingSink, NullSink};
pub use splitter::{extract_dockerfile, split_response};
pub use types::{AnalysisRequest, AnalysisResult};
