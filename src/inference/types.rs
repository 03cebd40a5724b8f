//! Inference request types and Ollama wire formats

use serde::{Deserialize, Serialize};

/// Sampling parameters forwarded to the model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    /// Temperature for sampling (0.0 = deterministic)
    pub temperature: f32,
    /// Top-p (nucleus) sampling threshold
    pub top_p: f32,
    /// Maximum number of tokens to generate
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            max_tokens: 4000,
        }
    }
}

/// A single generation request, independent of the backend
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateRequest {
    pub model: String,
    pub prompt: String,
    pub params: GenerationParams,
}

impl GenerateRequest {
    pub fn new(model: impl Into<String>, prompt: impl Into<String>, params: GenerationParams) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            params,
        }
    }
}

/// Request body for `POST /api/generate`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OllamaGenerateRequest {
    pub model: String,
    pub prompt: String,
    pub stream: bool,
    pub options: OllamaOptions,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub(crate) struct OllamaOptions {
    pub temperature: f32,
    pub top_p: f32,
    pub num_predict: u32,
}

impl From<&GenerateRequest> for OllamaGenerateRequest {
    fn from(request: &GenerateRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            stream: true,
            options: OllamaOptions {
                temperature: request.params.temperature,
                top_p: request.params.top_p,
                num_predict: request.params.max_tokens,
            },
        }
    }
}

/// One newline-delimited unit of a streamed `/api/generate` response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamUnit {
    /// Partial response text, absent on error units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response: Option<String>,

    /// Whether generation is complete
    #[serde(default)]
    pub done: bool,

    /// Error reported mid-stream by the server
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Number of tokens generated (final unit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub eval_count: Option<u32>,

    /// Total duration in nanoseconds (final unit only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_duration: Option<u64>,
}

/// Response body of `GET /api/tags`
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagsResponse {
    #[serde(default)]
    pub models: Vec<TagEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TagEntry {
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_serialization_enables_streaming() {
        let request = GenerateRequest::new(
            "qwen2.5-coder:7b",
            "review this",
            GenerationParams {
                temperature: 0.5,
                top_p: 0.9,
                max_tokens: 128,
            },
        );
        let body = OllamaGenerateRequest::from(&request);
        let json = serde_json::to_string(&body).unwrap();

        assert!(json.contains("\"model\":\"qwen2.5-coder:7b\""));
        assert!(json.contains("\"stream\":true"));
        assert!(json.contains("\"temperature\":0.5"));
        assert!(json.contains("\"num_predict\":128"));
    }

    #[test]
    fn test_stream_unit_minimal() {
        let unit: StreamUnit = serde_json::from_str(r#"{"response":"FROM","done":false}"#).unwrap();
        assert_eq!(unit.response.as_deref(), Some("FROM"));
        assert!(!unit.done);
        assert!(unit.error.is_none());
    }

    #[test]
    fn test_stream_unit_final_with_stats() {
        let json = r#"{
            "model": "qwen2.5-coder:7b",
            "created_at": "2024-01-01T00:00:00Z",
            "response": "",
            "done": true,
            "total_duration": 1000000,
            "eval_count": 20
        }"#;
        let unit: StreamUnit = serde_json::from_str(json).unwrap();
        assert!(unit.done);
        assert_eq!(unit.eval_count, Some(20));
        assert_eq!(unit.total_duration, Some(1_000_000));
    }

    #[test]
    fn test_default_params() {
        let params = GenerationParams::default();
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.top_p, 0.9);
        assert_eq!(params.max_tokens, 4000);
    }
}
