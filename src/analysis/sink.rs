//! Consumers of streamed text

use async_trait::async_trait;

/// Receives chunks as they arrive from the inference endpoint
#[async_trait]
pub trait ChunkSink: Send {
    /// Called once per chunk, in arrival order
    async fn on_chunk(&mut self, chunk: &str);

    /// Called after the last chunk of a successful stream
    async fn on_finish(&mut self) {}
}

/// Sink that discards everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

#[async_trait]
impl ChunkSink for NullSink {
    async fn on_chunk(&mut self, _chunk: &str) {}
}

/// Sink that records chunks; handy in tests
#[derive(Debug, Default, Clone)]
pub struct CollectingSink {
    pub chunks: Vec<String>,
    pub finished: bool,
}

#[async_trait]
impl ChunkSink for CollectingSink {
    async fn on_chunk(&mut self, chunk: &str) {
        self.chunks.push(chunk.to_string());
    }

    async fn on_finish(&mut self) {
        self.finished = true;
    }
}
