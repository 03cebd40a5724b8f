use super::backend::{ChunkStream, InferenceBackend};
use super::error::InferenceError;
use super::types::GenerateRequest;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Scripted backend for tests: each `generate_stream` call pops one response
pub struct MockInference {
    responses: Mutex<VecDeque<MockResponse>>,
    requests: Mutex<Vec<GenerateRequest>>,
    name: String,
}

#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Chunks yielded in order
    pub chunks: Vec<String>,
    /// Error returned after the chunks are exhausted (simulates a mid-stream failure)
    pub stream_error: Option<InferenceError>,
    /// Error returned instead of opening the stream
    pub open_error: Option<InferenceError>,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self::chunks([content.into()])
    }

    pub fn chunks<I, S>(chunks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            chunks: chunks.into_iter().map(Into::into).collect(),
            stream_error: None,
            open_error: None,
        }
    }

    pub fn fail_after<I, S>(chunks: I, error: InferenceError) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            stream_error: Some(error),
            ..Self::chunks(chunks)
        }
    }

    pub fn error(error: InferenceError) -> Self {
        Self {
            chunks: Vec::new(),
            stream_error: None,
            open_error: Some(error),
        }
    }
}

impl MockInference {
    pub fn new() -> Self {
        Self::with_name("MockInference")
    }

    pub fn with_name(name: impl Into<String>) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
            name: name.into(),
        }
    }

    pub fn add_response(&self, response: MockResponse) {
        self.responses.lock().unwrap().push_back(response);
    }

    pub fn remaining_responses(&self) -> usize {
        self.responses.lock().unwrap().len()
    }

    /// Requests received so far, oldest first
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockInference {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for MockInference {
    async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<Box<dyn ChunkStream>, InferenceError> {
        self.requests.lock().unwrap().push(request.clone());

        let response = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| InferenceError::Network {
                message: "MockInference: No more responses in queue".to_string(),
            })?;

        if let Some(error) = response.open_error {
            return Err(error);
        }

        Ok(Box::new(MockStream {
            chunks: response.chunks.into(),
            error: response.stream_error,
        }))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model_info(&self) -> Option<String> {
        Some("mock".to_string())
    }
}

struct MockStream {
    chunks: VecDeque<String>,
    error: Option<InferenceError>,
}

#[async_trait]
impl ChunkStream for MockStream {
    async fn next_chunk(&mut self) -> Result<Option<String>, InferenceError> {
        if let Some(chunk) = self.chunks.pop_front() {
            return Ok(Some(chunk));
        }
        match self.error.take() {
            Some(error) => Err(error),
            None => Ok(None),
        }
    }
}
