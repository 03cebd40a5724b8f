use super::sink::ChunkSink;
use super::splitter::split_response;
use super::types::{AnalysisRequest, AnalysisResult};
use crate::error::AnalyzerError;
use crate::inference::{GenerateRequest, InferenceBackend, InferenceError};
use crate::prompt::PromptLibrary;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Runs one analysis: compose the prompt, stream the response, split it
///
/// Chunks reach the sink as they arrive; the split only happens once the
/// stream has completed. A failed stream never produces a result, so callers
/// never persist a truncated response.
pub struct Analyzer {
    backend: Arc<dyn InferenceBackend>,
    prompts: PromptLibrary,
}

impl Analyzer {
    pub fn new(backend: Arc<dyn InferenceBackend>, prompts: PromptLibrary) -> Self {
        Self { backend, prompts }
    }

    pub fn backend(&self) -> &Arc<dyn InferenceBackend> {
        &self.backend
    }

    pub fn prompts(&self) -> &PromptLibrary {
        &self.prompts
    }

    pub async fn analyze(
        &self,
        request: &AnalysisRequest,
        sink: &mut dyn ChunkSink,
    ) -> Result<AnalysisResult, AnalyzerError> {
        let start = Instant::now();
        let prompt = self
            .prompts
            .compose(&request.prompt_version, &request.dockerfile)?;

        info!(
            "Analyzing Dockerfile with {} (model: {}, prompt: {})",
            self.backend.name(),
            request.model,
            request.prompt_version
        );
        debug!("Prompt length: {} chars", prompt.len());

        let generate = GenerateRequest::new(&request.model, prompt, request.params);
        let mut stream = self.backend.generate_stream(&generate).await?;

        let mut accumulated = String::new();
        let mut chunk_count = 0usize;
        while let Some(chunk) = stream.next_chunk().await? {
            chunk_count += 1;
            accumulated.push_str(&chunk);
            sink.on_chunk(&chunk).await;
        }
        sink.on_finish().await;

        debug!(
            "Stream complete: {} chunks, {} chars in {:?}",
            chunk_count,
            accumulated.len(),
            start.elapsed()
        );

        if accumulated.trim().is_empty() {
            return Err(InferenceError::EmptyResponse.into());
        }

        let result = split_response(&accumulated);
        info!(
            "Analysis complete in {:.1}s (corrected Dockerfile: {})",
            start.elapsed().as_secs_f64(),
            if result.has_corrected_dockerfile() {
                "yes"
            } else {
                "no"
            }
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::sink::CollectingSink;
    use crate::inference::{GenerationParams, MockInference, MockResponse};

    fn request(dockerfile: &str) -> AnalysisRequest {
        AnalysisRequest {
            dockerfile: dockerfile.to_string(),
            prompt_version: "advanced".to_string(),
            model: "qwen2.5-coder:7b".to_string(),
            params: GenerationParams::default(),
        }
    }

    fn analyzer(mock: MockInference) -> (Analyzer, Arc<MockInference>) {
        let mock = Arc::new(mock);
        let analyzer = Analyzer::new(mock.clone(), PromptLibrary::builtin());
        (analyzer, mock)
    }

    #[tokio::test]
    async fn test_chunks_fan_out_and_split() {
        let mock = MockInference::new();
        mock.add_response(MockResponse::chunks([
            "# Analysis\n\nPin the base image.\n\n",
            "```dockerfile\nFROM python:3.9-slim\n",
            "WORKDIR /app\n```\n",
        ]));
        let (analyzer, mock) = analyzer(mock);
        let mut sink = CollectingSink::default();

        let result = analyzer
            .analyze(&request("FROM python:latest\n"), &mut sink)
            .await
            .unwrap();

        assert_eq!(sink.chunks.len(), 3);
        assert!(sink.finished);
        assert_eq!(result.narrative, "# Analysis\n\nPin the base image.");
        assert_eq!(
            result.corrected_dockerfile.as_deref(),
            Some("FROM python:3.9-slim\nWORKDIR /app")
        );

        let sent = mock.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].model, "qwen2.5-coder:7b");
        assert!(sent[0].prompt.contains("FROM python:latest"));
    }

    #[tokio::test]
    async fn test_response_without_block() {
        let mock = MockInference::new();
        mock.add_response(MockResponse::text("Looks fine to me."));
        let (analyzer, _) = analyzer(mock);

        let result = analyzer
            .analyze(&request("FROM alpine\n"), &mut CollectingSink::default())
            .await
            .unwrap();

        assert_eq!(result.narrative, "Looks fine to me.");
        assert!(!result.has_corrected_dockerfile());
    }

    #[tokio::test]
    async fn test_mid_stream_failure_returns_error() {
        let mock = MockInference::new();
        mock.add_response(MockResponse::fail_after(
            ["partial analysis"],
            InferenceError::IncompleteStream { received: 1 },
        ));
        let (analyzer, _) = analyzer(mock);
        let mut sink = CollectingSink::default();

        let result = analyzer.analyze(&request("FROM alpine\n"), &mut sink).await;

        assert!(matches!(
            result,
            Err(AnalyzerError::Inference(InferenceError::IncompleteStream { .. }))
        ));
        assert_eq!(sink.chunks, vec!["partial analysis"]);
        assert!(!sink.finished);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_sends_nothing_to_sink() {
        let mock = MockInference::new();
        mock.add_response(MockResponse::error(InferenceError::EndpointUnreachable {
            endpoint: "http://localhost:11434".to_string(),
            message: "connection refused".to_string(),
        }));
        let (analyzer, _) = analyzer(mock);
        let mut sink = CollectingSink::default();

        let error = analyzer
            .analyze(&request("FROM alpine\n"), &mut sink)
            .await
            .unwrap_err();

        assert_eq!(error.kind(), "EndpointUnreachable");
        assert!(sink.chunks.is_empty());
    }

    #[tokio::test]
    async fn test_blank_response_is_empty_response() {
        let mock = MockInference::new();
        mock.add_response(MockResponse::chunks(["", "  \n"]));
        let (analyzer, _) = analyzer(mock);

        let error = analyzer
            .analyze(&request("FROM alpine\n"), &mut CollectingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(
            error,
            AnalyzerError::Inference(InferenceError::EmptyResponse)
        ));
    }

    #[tokio::test]
    async fn test_unknown_template_fails_before_request() {
        let (analyzer, mock) = analyzer(MockInference::new());
        let mut req = request("FROM alpine\n");
        req.prompt_version = "nonexistent".to_string();

        let error = analyzer
            .analyze(&req, &mut CollectingSink::default())
            .await
            .unwrap_err();

        assert!(matches!(error, AnalyzerError::Template(_)));
        assert!(mock.requests().is_empty());
    }
}
