//! Ollama HTTP client for local LLM inference
//!
//! Talks to the Ollama `/api/generate` endpoint in streaming mode and exposes
//! the response as a [`ChunkStream`]. The body is newline-delimited JSON; each
//! unit carries a partial `response` and a `done` flag.
//!
//! # Example
//!
//! ```no_run
//! use dockerfile_ai::inference::{GenerateRequest, InferenceBackend, OllamaClient};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(120))?;
//!
//! if client.health_check().await? {
//!     let request = GenerateRequest::new("qwen2.5-coder:7b", "Review: FROM alpine", Default::default());
//!     let mut stream = client.generate_stream(&request).await?;
//!     while let Some(chunk) = stream.next_chunk().await? {
//!         print!("{}", chunk);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use super::backend::{ChunkStream, InferenceBackend};
use super::error::InferenceError;
use super::ndjson::NdjsonDecoder;
use super::types::{GenerateRequest, OllamaGenerateRequest, StreamUnit, TagsResponse};
use async_trait::async_trait;
use reqwest::{Client, Response};
use std::collections::VecDeque;
use std::fmt;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

/// Default request timeout for a full generation
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama client for local LLM inference
///
/// The client is cheap to clone and safe to share across concurrent calls; the
/// underlying `reqwest::Client` pools connections.
#[derive(Clone)]
pub struct OllamaClient {
    /// Ollama API endpoint URL, without trailing slash
    endpoint: String,

    /// Shared HTTP client
    http_client: Client,

    /// Wall-clock limit for one request, body included
    timeout: Duration,
}

impl OllamaClient {
    /// Creates a client for the given endpoint (e.g. "http://localhost:11434")
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, InferenceError> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();

        let http_client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Network {
                message: format!("Failed to build HTTP client: {}", e),
            })?;

        Ok(Self {
            endpoint,
            http_client,
            timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Checks if the Ollama server is reachable
    ///
    /// Returns `Ok(false)` for timeouts and refused connections so callers can
    /// decide how loudly to complain.
    pub async fn health_check(&self) -> Result<bool, InferenceError> {
        let url = format!("{}/api/tags", self.endpoint);

        debug!("Checking Ollama health at {}", url);

        match self.http_client.get(&url).send().await {
            Ok(response) => {
                let is_healthy = response.status().is_success();
                if is_healthy {
                    debug!("Ollama health check successful");
                } else {
                    warn!(
                        "Ollama health check failed with status: {}",
                        response.status()
                    );
                }
                Ok(is_healthy)
            }
            Err(e) => {
                if e.is_timeout() {
                    warn!("Ollama health check timed out");
                    Ok(false)
                } else if e.is_connect() {
                    warn!("Cannot connect to Ollama at {}", self.endpoint);
                    Ok(false)
                } else {
                    error!("Ollama health check error: {}", e);
                    Err(InferenceError::Network {
                        message: format!("Health check failed: {}", e),
                    })
                }
            }
        }
    }

    /// Lists model names installed on the server
    pub async fn available_models(&self) -> Result<Vec<String>, InferenceError> {
        let url = format!("{}/api/tags", self.endpoint);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.endpoint, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(InferenceError::Api {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        let tags: TagsResponse = response.json().await.map_err(|e| InferenceError::Api {
            status: None,
            message: format!("Invalid /api/tags payload: {}", e),
        })?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    /// Returns true if `model` matches an installed model name
    ///
    /// A bare name such as "llama3" matches "llama3:latest".
    pub async fn has_model(&self, model: &str) -> Result<bool, InferenceError> {
        let models = self.available_models().await?;
        let available = models.iter().any(|m| m == model || m.starts_with(&format!("{}:", model)));
        if !available {
            warn!(
                "Model {} not found in Ollama. Available models: {}",
                model,
                models.join(", ")
            );
        }
        Ok(available)
    }
}

#[async_trait]
impl InferenceBackend for OllamaClient {
    async fn generate_stream(
        &self,
        request: &GenerateRequest,
    ) -> Result<Box<dyn ChunkStream>, InferenceError> {
        let url = format!("{}/api/generate", self.endpoint);
        let body = OllamaGenerateRequest::from(request);

        debug!(
            "Sending request to Ollama: model={}, prompt_length={}",
            request.model,
            request.prompt.len()
        );

        let response = self
            .http_client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| map_transport_error(e, &self.endpoint, self.timeout))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();

            error!("Ollama API returned error status {}: {}", status, body);

            if status.as_u16() == 404 && body.contains("model") {
                return Err(InferenceError::ModelNotFound {
                    model: request.model.clone(),
                });
            }

            return Err(InferenceError::Api {
                status: Some(status.as_u16()),
                message: body,
            });
        }

        Ok(Box::new(OllamaStream {
            response,
            decoder: NdjsonDecoder::new(),
            pending: VecDeque::new(),
            finished: false,
            received: 0,
            started: Instant::now(),
            endpoint: self.endpoint.clone(),
            timeout: self.timeout,
        }))
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn model_info(&self) -> Option<String> {
        Some(format!("ollama @ {}", self.endpoint))
    }
}

impl fmt::Debug for OllamaClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OllamaClient")
            .field("endpoint", &self.endpoint)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Streaming body of one `/api/generate` call
struct OllamaStream {
    response: Response,
    decoder: NdjsonDecoder,
    pending: VecDeque<String>,
    finished: bool,
    received: usize,
    started: Instant,
    endpoint: String,
    timeout: Duration,
}

impl OllamaStream {
    fn accept(&mut self, unit: StreamUnit) {
        if self.finished {
            return;
        }
        self.received += 1;

        if let Some(text) = unit.response {
            if !text.is_empty() {
                self.pending.push_back(text);
            }
        }

        if unit.done {
            self.finished = true;
            info!(
                "Ollama generation completed in {:.2}s ({} chunks)",
                self.started.elapsed().as_secs_f64(),
                self.received
            );
            debug!(
                "Ollama stats: eval_tokens={}, total_duration={:?}",
                unit.eval_count.unwrap_or(0),
                unit.total_duration
            );
        }
    }
}

#[async_trait]
impl ChunkStream for OllamaStream {
    async fn next_chunk(&mut self) -> Result<Option<String>, InferenceError> {
        loop {
            if let Some(chunk) = self.pending.pop_front() {
                return Ok(Some(chunk));
            }
            if self.finished {
                return Ok(None);
            }

            let bytes = self
                .response
                .chunk()
                .await
                .map_err(|e| map_transport_error(e, &self.endpoint, self.timeout))?;

            match bytes {
                Some(bytes) => {
                    for unit in self.decoder.push(&bytes)? {
                        self.accept(unit);
                    }
                }
                None => {
                    if self.decoder.pending() > 0 {
                        debug!(
                            "Body ended with {} bytes after the last newline",
                            self.decoder.pending()
                        );
                    }
                    if let Some(unit) = self.decoder.finish()? {
                        self.accept(unit);
                    }
                    if !self.finished {
                        warn!(
                            "Ollama stream ended after {} chunks without completion",
                            self.received
                        );
                        return Err(InferenceError::IncompleteStream {
                            received: self.received,
                        });
                    }
                }
            }
        }
    }
}

fn map_transport_error(e: reqwest::Error, endpoint: &str, timeout: Duration) -> InferenceError {
    if e.is_timeout() {
        error!("Ollama request timed out after {:?}", timeout);
        InferenceError::Timeout {
            seconds: timeout.as_secs(),
        }
    } else if e.is_connect() {
        error!("Cannot connect to Ollama at {}", endpoint);
        InferenceError::EndpointUnreachable {
            endpoint: endpoint.to_string(),
            message: e.to_string(),
        }
    } else {
        error!("Ollama request error: {}", e);
        InferenceError::Network {
            message: format!("Request failed: {}", e),
        }
    }
}
